//! Temporary project directories
//!
//! A [`TestProject`] owns a temp directory acting as the project base dir,
//! optionally with a `.env` file in it.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    /// Create a project whose `.env` holds the given lines
    pub fn with_env_file(lines: &[&str]) -> Self {
        let project = Self::new();
        project.write_env_file(lines);
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn env_file(&self) -> PathBuf {
        self.path().join(".env")
    }

    pub fn write_env_file(&self, lines: &[&str]) {
        fs::write(self.env_file(), lines.join("\n") + "\n").expect("Failed to write .env");
    }
}
