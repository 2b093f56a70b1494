//! Logging configuration and setup
//!
//! This module installs the global tracing subscriber from [`LoggingConfig`]
//! and provides structured logging helpers for startup.

use tracing::{info, warn};
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::config::{LoggingConfig, Settings};
use crate::utils::errors::{ConfigurationError, Result};

/// Build the level filter. `RUST_LOG` takes precedence when set.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives),
        _ => EnvFilter::try_new(config.filter_directives()),
    };

    filter.map_err(|e| ConfigurationError::Invalid(format!("Invalid log filter: {}", e)))
}

/// Threshold of the console handler
pub fn console_level(config: &LoggingConfig) -> Result<LevelFilter> {
    config.level.parse::<LevelFilter>().map_err(|e| {
        ConfigurationError::Invalid(format!("Invalid console log level {}: {}", config.level, e))
    })
}

/// Initialize logging based on configuration.
///
/// Console lines carry the timestamp, level, target and any enclosing span
/// fields, so callers wrap their work in a span holding the process id.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let console = console_level(config)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_filter(console),
        )
        .try_init()
        .map_err(|e| ConfigurationError::Invalid(format!("Logging already initialized: {}", e)))?;

    info!(directives = %config.filter_directives(), "Logging initialized");
    Ok(())
}

/// Log a one-line summary of the loaded settings
pub fn log_settings_summary(settings: &Settings) {
    info!(
        debug = settings.debug,
        base_hostname = %settings.base_hostname,
        admin_base_url = %settings.cms.admin_base_url,
        allowed_hosts = ?settings.allowed_hosts,
        database_engine = settings.databases.default.engine.backend(),
        default_cache = settings.caches.default.backend.backend(),
        rendition_cache = settings.caches.renditions.backend.backend(),
        media_storage = %settings.media.storage,
        ssl_redirect = settings.security.ssl_redirect.enabled,
        hsts_seconds = settings.security.hsts.seconds,
        "Settings summary"
    );

    if settings.debug {
        warn!("Debug mode is on: security hardening is disabled");
    } else if settings.allowed_hosts.is_empty() {
        warn!("ALLOWED_HOSTS is empty: every request host will be rejected");
    }
}
