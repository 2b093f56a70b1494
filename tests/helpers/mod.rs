//! Test helpers module
//!
//! Environment builders and temporary project directories shared by the
//! integration tests.

#![allow(dead_code)]

pub mod test_project;

pub use test_project::*;

use std::path::Path;
use zerolab::{Env, Result, Settings};

pub const TEST_BASE_DIR: &str = "/srv/zerolab";

/// Build an environment from literal pairs
pub fn test_env(vars: &[(&str, &str)]) -> Env {
    Env::from_map(vars.iter().copied())
}

/// Load settings from literal pairs against the test base directory
pub fn load(vars: &[(&str, &str)]) -> Result<Settings> {
    Settings::from_env(&test_env(vars), Path::new(TEST_BASE_DIR))
}

/// Load settings with a secret key plus extra pairs
pub fn load_with_secret(extra: &[(&str, &str)]) -> Settings {
    let mut vars = vec![("SECRET_KEY", "test-secret")];
    vars.extend_from_slice(extra);
    load(&vars).expect("settings should load")
}
