//! Configuration management module
//!
//! This module turns environment variables (and an optional local `.env`
//! file) into one immutable [`Settings`] record.

pub mod apps;
pub mod cache;
pub mod cms;
pub mod database;
pub mod env;
pub mod secret;
pub mod security;
pub mod settings;
pub mod storage;
pub mod validation;

pub use apps::{InstalledApps, TemplatesConfig};
pub use cache::{CacheBackend, CacheConfig, Caches};
pub use cms::CmsConfig;
pub use database::{DatabaseConfig, DatabaseEngine, Databases};
pub use env::Env;
pub use secret::Secret;
pub use security::{CorsConfig, CspConfig, HstsConfig, PermissionsPolicy, SecurityConfig};
pub use settings::{I18nConfig, LoggingConfig, Settings, SettingsLoader};
pub use storage::{MediaConfig, ObjectStorage, StaticFilesConfig};
