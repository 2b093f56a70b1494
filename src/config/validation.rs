//! Configuration validation module
//!
//! Cross-field checks run after [`Settings`] is assembled, so a record that
//! reaches the rest of the application always satisfies them.

use super::apps::STORAGES_APP;
use super::Settings;
use crate::utils::errors::{ConfigurationError, Result};

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_hosts(settings)?;
    validate_security(settings)?;
    validate_media(settings)?;
    settings.middleware.validate()?;
    validate_databases(settings)?;
    validate_logging(settings)?;

    Ok(())
}

fn validate_hosts(settings: &Settings) -> Result<()> {
    if !settings.debug && settings.allowed_hosts.iter().any(|host| host == "*") {
        return Err(ConfigurationError::Invalid(
            "Wildcard allowed host is only permitted in debug mode".to_string(),
        ));
    }

    Ok(())
}

/// The debug switches move together
fn validate_security(settings: &Settings) -> Result<()> {
    let security = &settings.security;
    let strict = !settings.debug;

    let coupled = [
        ("SSL redirect", security.ssl_redirect.enabled),
        ("HSTS", security.hsts.is_enabled()),
        ("secure session cookie", security.cookies.session_cookie_secure),
        ("secure CSRF cookie", security.cookies.csrf_cookie_secure),
        ("mixed content blocking", security.csp.block_all_mixed_content),
        ("insecure request upgrade", security.csp.upgrade_insecure_requests),
        ("two-factor requirement", security.two_factor_required),
        ("CORS allow-all", security.cors.allow_all_origins),
    ];

    for (name, enabled) in coupled {
        if enabled != strict {
            return Err(ConfigurationError::Invalid(format!(
                "{} must be {} when debug is {}",
                name,
                if strict { "enabled" } else { "disabled" },
                settings.debug
            )));
        }
    }

    Ok(())
}

fn validate_media(settings: &Settings) -> Result<()> {
    let active = settings.media.uses_object_storage();
    if active != settings.installed_apps.contains(STORAGES_APP) {
        return Err(ConfigurationError::Invalid(format!(
            "The {} app must be installed exactly when object storage is active",
            STORAGES_APP
        )));
    }

    Ok(())
}

fn validate_databases(settings: &Settings) -> Result<()> {
    if settings.databases.default.name.is_empty() {
        return Err(ConfigurationError::Invalid(
            "Default database name is required".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(settings: &Settings) -> Result<()> {
    let logging = &settings.logging;
    let levels = std::iter::once(("console", &logging.level))
        .chain(std::iter::once(("root", &logging.root_level)))
        .chain(logging.loggers.iter().map(|(target, level)| (target.as_str(), level)));

    for (target, level) in levels {
        if !VALID_LEVELS.contains(&level.as_str()) {
            return Err(ConfigurationError::Invalid(format!(
                "Invalid log level for {}: {}. Valid levels: {:?}",
                target, level, VALID_LEVELS
            )));
        }
    }

    Ok(())
}
