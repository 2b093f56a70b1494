//! Typed environment reader
//!
//! [`Env`] wraps a snapshot of string variables and coerces them into
//! booleans, lists, integers and URLs. It never writes back to the process
//! environment: the optional `.env` file is merged into the snapshot, with
//! real process variables taking precedence over file entries.

use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;
use url::Url;

use super::cache::CacheConfig;
use super::database::DatabaseConfig;
use crate::utils::errors::{ConfigurationError, Result};

const TRUE_STRINGS: [&str; 6] = ["true", "on", "ok", "y", "yes", "1"];
const FALSE_STRINGS: [&str; 6] = ["false", "off", "n", "no", "0", ""];

/// Immutable snapshot of environment variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Env {
    vars: BTreeMap<String, String>,
}

impl Env {
    /// Build an environment from arbitrary key/value pairs
    pub fn from_map<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Snapshot the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        Self::from_map(std::env::vars_os().filter_map(|(k, v)| {
            Some((k.into_string().ok()?, v.into_string().ok()?))
        }))
    }

    /// Snapshot the process environment on top of a `.env` file
    pub fn from_process_with_file(path: &Path) -> Result<Self> {
        Ok(Self::read_env_file(path)?.overlay(Self::from_process()))
    }

    /// Read a `.env` file. A missing file yields an empty environment.
    pub fn read_env_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No environment file found, skipping");
            return Ok(Self::default());
        }

        let env_file_error = |source| ConfigurationError::EnvFile {
            path: path.to_path_buf(),
            source,
        };

        let mut vars = BTreeMap::new();
        for entry in dotenv::from_path_iter(path).map_err(env_file_error)? {
            let (key, value) = entry.map_err(env_file_error)?;
            vars.insert(key, value);
        }

        debug!(path = %path.display(), count = vars.len(), "Loaded environment file");
        Ok(Self { vars })
    }

    /// Merge `other` into this environment; `other` wins on conflicts
    pub fn overlay(mut self, other: Env) -> Self {
        self.vars.extend(other.vars);
        self
    }

    /// Raw value of a variable
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Whether a variable is set at all (empty values count as set)
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Required string variable
    pub fn str(&self, name: &str) -> Result<String> {
        self.get(name)
            .map(str::to_string)
            .ok_or_else(|| ConfigurationError::MissingVariable { name: name.to_string() })
    }

    /// String variable with a default
    pub fn str_or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or(default).to_string()
    }

    /// Boolean variable with a default
    pub fn bool_or(&self, name: &str, default: bool) -> Result<bool> {
        match self.get(name) {
            Some(raw) => parse_bool(name, raw),
            None => Ok(default),
        }
    }

    /// Comma separated list with a default
    pub fn list_or(&self, name: &str, default: &[&str]) -> Vec<String> {
        match self.get(name) {
            Some(raw) => parse_list(raw),
            None => default.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Integer variable with a default
    pub fn int_or(&self, name: &str, default: i64) -> Result<i64> {
        match self.get(name) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigurationError::invalid_value(name, raw, "integer")),
            None => Ok(default),
        }
    }

    /// URL variable with a default
    pub fn url_or(&self, name: &str, default: &str) -> Result<Url> {
        let raw = self.get(name).unwrap_or(default);
        Url::parse(raw).map_err(|source| ConfigurationError::InvalidUrl {
            name: name.to_string(),
            source,
        })
    }

    /// Database descriptor read from a URL variable
    pub fn database_url_or(&self, name: &str, default: &str) -> Result<DatabaseConfig> {
        DatabaseConfig::parse(name, self.get(name).unwrap_or(default))
    }

    /// Cache descriptor read from a URL variable
    pub fn cache_url_or(&self, name: &str, default: &str) -> Result<CacheConfig> {
        CacheConfig::parse(name, self.get(name).unwrap_or(default))
    }
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    let value = raw.trim().to_ascii_lowercase();
    if TRUE_STRINGS.contains(&value.as_str()) {
        Ok(true)
    } else if FALSE_STRINGS.contains(&value.as_str()) {
        Ok(false)
    } else {
        Err(ConfigurationError::invalid_value(name, raw, "boolean"))
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
