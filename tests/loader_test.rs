//! Loader tests against real files and the process environment
//!
//! These mutate process variables, so they run serially.

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use serial_test::serial;
use zerolab::{ConfigurationError, Env, Settings, SettingsLoader};

const MANAGED_VARS: [&str; 6] = [
    "SECRET_KEY",
    "DEBUG",
    "BASE_HOSTNAME",
    "ALLOWED_HOSTS",
    "AWS_STORAGE_BUCKET_NAME",
    "DATABASE_URL",
];

/// Removes the variables the tests touch, before and after each test
struct EnvGuard;

impl EnvGuard {
    fn new() -> Self {
        Self::clear();
        Self
    }

    fn clear() {
        for name in MANAGED_VARS {
            std::env::remove_var(name);
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        Self::clear();
    }
}

#[test]
#[serial]
fn test_env_file_supplies_secret() {
    let _guard = EnvGuard::new();
    let project = TestProject::with_env_file(&["SECRET_KEY=from-file", "DEBUG=true"]);

    let settings = SettingsLoader::new(project.path()).load().unwrap();
    assert_eq!(settings.secret_key.expose(), "from-file");
    assert!(settings.debug);
}

#[test]
#[serial]
fn test_process_env_overrides_env_file() {
    let _guard = EnvGuard::new();
    let project = TestProject::with_env_file(&["SECRET_KEY=from-file", "BASE_HOSTNAME=file.example"]);
    std::env::set_var("BASE_HOSTNAME", "process.example");

    let settings = SettingsLoader::new(project.path()).load().unwrap();
    assert_eq!(settings.secret_key.expose(), "from-file");
    assert_eq!(settings.cms.admin_base_url, "https://process.example");
}

#[test]
#[serial]
fn test_loader_does_not_mutate_process_env() {
    let _guard = EnvGuard::new();
    let project = TestProject::with_env_file(&["SECRET_KEY=from-file"]);

    SettingsLoader::new(project.path()).load().unwrap();
    assert!(std::env::var("SECRET_KEY").is_err());
}

#[test]
#[serial]
fn test_missing_env_file_uses_process_env() {
    let _guard = EnvGuard::new();
    let project = TestProject::new();
    std::env::set_var("SECRET_KEY", "from-process");

    let settings = Settings::load(project.path()).unwrap();
    assert_eq!(settings.secret_key.expose(), "from-process");
    assert_eq!(
        settings.databases.default.name,
        project.path().join("db.sqlite3").display().to_string()
    );
}

#[test]
#[serial]
fn test_missing_secret_fails_startup() {
    let _guard = EnvGuard::new();
    let project = TestProject::with_env_file(&["DEBUG=true"]);

    assert_matches!(
        SettingsLoader::new(project.path()).load(),
        Err(ConfigurationError::MissingVariable { .. })
    );
}

#[test]
#[serial]
fn test_env_file_can_be_disabled() {
    let _guard = EnvGuard::new();
    let project = TestProject::with_env_file(&["SECRET_KEY=from-file"]);

    let result = SettingsLoader::new(project.path()).without_env_file().load();
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_explicit_env_file() {
    let _guard = EnvGuard::new();
    let project = TestProject::new();
    let other = TestProject::with_env_file(&["SECRET_KEY=elsewhere"]);

    let settings = SettingsLoader::new(project.path())
        .with_env_file(other.env_file())
        .load()
        .unwrap();
    assert_eq!(settings.secret_key.expose(), "elsewhere");
    assert_eq!(settings.base_dir, project.path());
}

#[test]
#[serial]
fn test_loading_twice_is_identical() {
    let _guard = EnvGuard::new();
    let project = TestProject::with_env_file(&[
        "SECRET_KEY=k",
        "ALLOWED_HOSTS=zerolab.org",
        "AWS_STORAGE_BUCKET_NAME=bucket",
    ]);

    let loader = SettingsLoader::new(project.path());
    assert_eq!(loader.load().unwrap(), loader.load().unwrap());
}

#[test]
fn test_malformed_env_file() {
    let project = TestProject::with_env_file(&["SECRET_KEY='unterminated"]);
    assert_matches!(
        Env::read_env_file(&project.env_file()),
        Err(ConfigurationError::EnvFile { .. })
    );
}
