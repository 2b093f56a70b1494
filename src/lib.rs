//! zerolab settings
//!
//! Typed configuration loader for the zerolab.org content site. Reads the
//! process environment (plus an optional local `.env` file) once at startup
//! and produces an immutable [`Settings`] record describing the installed
//! modules, middleware order, storage, caches, CMS and security policy.

pub mod config;
pub mod middleware;
pub mod utils;

// Re-export commonly used types
pub use config::{Env, Settings, SettingsLoader};
pub use middleware::{Middleware, MiddlewareChain};
pub use utils::errors::{ConfigurationError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
