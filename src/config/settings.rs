//! Application settings
//!
//! [`Settings`] is built once at startup from an [`Env`] snapshot and is
//! never mutated afterwards. Share it by reference or behind an `Arc`.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::apps::{InstalledApps, TemplatesConfig};
use super::cache::Caches;
use super::cms::{admin_base_url, CmsConfig};
use super::database::Databases;
use super::env::Env;
use super::secret::Secret;
use super::security::SecurityConfig;
use super::storage::{MediaConfig, StaticFilesConfig};
use crate::middleware::MiddlewareChain;
use crate::utils::errors::Result;

pub const DEFAULT_BASE_HOSTNAME: &str = "zerolab.org";
pub const DEFAULT_CACHE_URL: &str = "dummycache://";
pub const DEFAULT_RENDITION_CACHE_URL: &str = "locmemcache://renditions";

const ALLOW_ANY_HOST: &str = "*";

/// Main application configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub base_dir: PathBuf,
    pub secret_key: Secret,
    pub debug: bool,
    pub base_hostname: String,
    pub sentry_dsn: String,
    pub allowed_hosts: Vec<String>,
    pub installed_apps: InstalledApps,
    pub middleware: MiddlewareChain,
    pub root_urlconf: String,
    pub wsgi_application: String,
    pub templates: TemplatesConfig,
    pub databases: Databases,
    pub caches: Caches,
    pub i18n: I18nConfig,
    pub static_files: StaticFilesConfig,
    pub media: MediaConfig,
    pub cms: CmsConfig,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
}

/// Internationalization configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct I18nConfig {
    pub language_code: String,
    pub time_zone: String,
    pub use_i18n: bool,
    pub use_l10n: bool,
    pub use_tz: bool,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            language_code: "en-gb".to_string(),
            time_zone: "UTC".to_string(),
            use_i18n: true,
            use_l10n: true,
            use_tz: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggingConfig {
    /// Console handler threshold
    pub level: String,
    /// Level for targets without their own logger
    pub root_level: String,
    /// Logger name to level
    pub loggers: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let loggers = [
            ("zerolab", "info"),
            ("wagtail", "warn"),
            ("django.request", "error"),
            ("django.security", "warn"),
        ]
        .into_iter()
        .map(|(target, level)| (target.to_string(), level.to_string()))
        .collect();

        Self {
            level: "info".to_string(),
            root_level: "warn".to_string(),
            loggers,
        }
    }
}

impl LoggingConfig {
    /// `EnvFilter` directives, e.g. `warn,django::request=error,zerolab=info`.
    /// Dotted logger names become `::` separated tracing targets.
    pub fn filter_directives(&self) -> String {
        std::iter::once(self.root_level.clone())
            .chain(
                self.loggers
                    .iter()
                    .map(|(target, level)| format!("{}={}", target.replace('.', "::"), level)),
            )
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Settings {
    /// Build settings from an environment snapshot.
    ///
    /// `base_dir` anchors the default SQLite file, static sources and the
    /// media root.
    pub fn from_env(env: &Env, base_dir: &Path) -> Result<Self> {
        let secret_key = Secret::new(env.str("SECRET_KEY")?);
        let debug = env.bool_or("DEBUG", false)?;
        let base_hostname = env.str_or("BASE_HOSTNAME", DEFAULT_BASE_HOSTNAME);
        let sentry_dsn = env.str_or("SENTRY_DSN", "");

        let allowed_hosts = if debug {
            vec![ALLOW_ANY_HOST.to_string()]
        } else {
            env.list_or("ALLOWED_HOSTS", &[])
        };

        let default_database_url = format!("sqlite:///{}", base_dir.join("db.sqlite3").display());
        let databases = Databases {
            default: env.database_url_or("DATABASE_URL", &default_database_url)?,
        };
        let caches = Caches {
            default: env.cache_url_or("CACHE_URL", DEFAULT_CACHE_URL)?,
            renditions: env.cache_url_or("RENDITION_CACHE_URL", DEFAULT_RENDITION_CACHE_URL)?,
        };

        let media = MediaConfig::from_env(env, base_dir);
        let admin_base_url = admin_base_url(&base_hostname);
        let security = SecurityConfig::from_env(env, debug, &admin_base_url)?;

        let settings = Self {
            base_dir: base_dir.to_path_buf(),
            secret_key,
            debug,
            sentry_dsn,
            allowed_hosts,
            installed_apps: InstalledApps::new(media.uses_object_storage()),
            middleware: MiddlewareChain::standard(),
            root_urlconf: "zerolab.urls".to_string(),
            wsgi_application: "zerolab.wsgi.application".to_string(),
            templates: TemplatesConfig::default(),
            databases,
            caches,
            i18n: I18nConfig::default(),
            static_files: StaticFilesConfig::new(base_dir, debug),
            media,
            cms: CmsConfig::new(&base_hostname),
            security,
            logging: LoggingConfig::default(),
            base_hostname,
        };

        settings.validate()?;
        debug!(debug = settings.debug, hosts = ?settings.allowed_hosts, "Settings constructed");
        Ok(settings)
    }

    /// Load settings for `base_dir`, reading `<base_dir>/.env` if present
    pub fn load(base_dir: &Path) -> Result<Self> {
        SettingsLoader::new(base_dir).load()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        super::validation::validate_settings(self)
    }

    /// Whether a `Host` header value is accepted
    pub fn is_host_allowed(&self, host: &str) -> bool {
        let host = strip_port(host).to_ascii_lowercase();
        self.allowed_hosts.iter().any(|pattern| {
            let pattern = pattern.to_ascii_lowercase();
            if pattern == ALLOW_ANY_HOST {
                true
            } else if let Some(domain) = pattern.strip_prefix('.') {
                host == domain || host.ends_with(&pattern)
            } else {
                host == pattern
            }
        })
    }
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // IPv6 literal, keep brackets
        return host.split_once(']').map(|(addr, _)| &host[..addr.len() + 1]).unwrap_or(host);
    }
    if host.matches(':').count() != 1 {
        // no port, or a bare IPv6 address
        return host;
    }
    host.rsplit_once(':')
        .filter(|(_, port)| port.chars().all(|c| c.is_ascii_digit()))
        .map(|(name, _)| name)
        .unwrap_or(host)
}

/// Reads the local `.env` file and the process environment, then builds
/// [`Settings`]
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    base_dir: PathBuf,
    env_file: Option<PathBuf>,
}

impl SettingsLoader {
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        let base_dir = base_dir.into();
        let env_file = Some(base_dir.join(".env"));
        Self { base_dir, env_file }
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.env_file = Some(path.into());
        self
    }

    pub fn without_env_file(mut self) -> Self {
        self.env_file = None;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Environment snapshot: `.env` entries overridden by process variables
    pub fn env(&self) -> Result<Env> {
        match &self.env_file {
            Some(path) => Env::from_process_with_file(path),
            None => Ok(Env::from_process()),
        }
    }

    pub fn load(&self) -> Result<Settings> {
        let env = self.env()?;
        let settings = Settings::from_env(&env, &self.base_dir)?;
        info!(
            debug = settings.debug,
            base_hostname = %settings.base_hostname,
            object_storage = settings.media.uses_object_storage(),
            "Settings loaded"
        );
        Ok(settings)
    }
}
