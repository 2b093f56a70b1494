//! zerolab settings CLI
//!
//! Loads the settings the way the web application does at startup and
//! either validates them or prints them.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{error, info_span};

use zerolab::config::{LoggingConfig, SettingsLoader};
use zerolab::utils::logging;

#[derive(Debug, Parser)]
#[command(name = "zerolab", version, about = "Load and inspect zerolab settings")]
struct Cli {
    /// Project base directory
    #[arg(long, env = "ZEROLAB_BASE_DIR", default_value = ".", global = true)]
    base_dir: PathBuf,

    /// Environment file to read before the process environment
    #[arg(long, global = true, conflicts_with = "no_env_file")]
    env_file: Option<PathBuf>,

    /// Ignore any environment file
    #[arg(long, global = true)]
    no_env_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load and validate the settings
    Check,
    /// Print the loaded settings, secrets redacted
    Show {
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Toml,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init_logging(&LoggingConfig::default())?;
    let _process = info_span!("zerolab", pid = std::process::id()).entered();

    let mut loader = SettingsLoader::new(&cli.base_dir);
    if let Some(path) = &cli.env_file {
        loader = loader.with_env_file(path);
    } else if cli.no_env_file {
        loader = loader.without_env_file();
    }

    let settings = match loader.load() {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, variable = ?e.variable(), "Failed to load settings");
            return Err(e.into());
        }
    };

    match cli.command {
        Command::Check => logging::log_settings_summary(&settings),
        Command::Show { format } => {
            let rendered = match format {
                Format::Json => serde_json::to_string_pretty(&settings)
                    .context("Failed to render settings as JSON")?,
                Format::Toml => {
                    toml::to_string_pretty(&settings).context("Failed to render settings as TOML")?
                }
            };
            println!("{}", rendered);
        }
    }

    Ok(())
}
