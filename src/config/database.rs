//! Database connection descriptors
//!
//! Parses `DATABASE_URL`-style strings into a [`DatabaseConfig`] that the
//! web framework's ORM consumes. Only the descriptor is produced here; no
//! connection is ever opened by the loader.

use serde::Serialize;
use std::collections::BTreeMap;
use url::Url;

use super::secret::Secret;
use crate::utils::errors::{ConfigurationError, Result};

const SQLITE_MEMORY: &str = ":memory:";

/// Database engine selected by the URL scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseEngine {
    Sqlite,
    Spatialite,
    Postgresql,
    Postgis,
    Mysql,
    MysqlGis,
    Oracle,
}

impl DatabaseEngine {
    fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "sqlite" => Some(Self::Sqlite),
            "spatialite" => Some(Self::Spatialite),
            "postgres" | "postgresql" | "pgsql" | "psql" => Some(Self::Postgresql),
            "postgis" => Some(Self::Postgis),
            "mysql" | "mysql2" => Some(Self::Mysql),
            "mysqlgis" => Some(Self::MysqlGis),
            "oracle" => Some(Self::Oracle),
            _ => None,
        }
    }

    /// Import path of the framework backend
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Sqlite => "django.db.backends.sqlite3",
            Self::Spatialite => "django.contrib.gis.db.backends.spatialite",
            Self::Postgresql => "django.db.backends.postgresql",
            Self::Postgis => "django.contrib.gis.db.backends.postgis",
            Self::Mysql => "django.db.backends.mysql",
            Self::MysqlGis => "django.contrib.gis.db.backends.mysql",
            Self::Oracle => "django.db.backends.oracle",
        }
    }

    pub fn is_file_based(&self) -> bool {
        matches!(self, Self::Sqlite | Self::Spatialite)
    }
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseConfig {
    pub engine: DatabaseEngine,
    pub name: String,
    pub user: Option<String>,
    pub password: Option<Secret>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub options: BTreeMap<String, String>,
}

/// Named database connections
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Databases {
    pub default: DatabaseConfig,
}

impl DatabaseConfig {
    /// Parse a database URL. `name` is the variable it came from, for errors.
    pub fn parse(name: &str, raw: &str) -> Result<Self> {
        let scheme = raw.split_once("://").map(|(scheme, _)| scheme).unwrap_or_default();
        let engine = DatabaseEngine::from_scheme(scheme).ok_or_else(|| {
            ConfigurationError::UnsupportedScheme {
                name: name.to_string(),
                scheme: scheme.to_string(),
            }
        })?;

        if engine.is_file_based() {
            return Ok(Self::file_based(engine, &raw[scheme.len() + 3..]));
        }

        let url = Url::parse(raw).map_err(|source| ConfigurationError::InvalidUrl {
            name: name.to_string(),
            source,
        })?;

        Ok(Self {
            engine,
            name: decode(url.path().trim_start_matches('/')),
            user: Some(decode(url.username())).filter(|user| !user.is_empty()),
            password: url.password().map(|password| Secret::new(decode(password))),
            host: url.host_str().filter(|host| !host.is_empty()).map(str::to_string),
            port: url.port(),
            options: url.query_pairs().into_owned().collect(),
        })
    }

    // `sqlite:////abs/path` names an absolute file, `sqlite:///rel` a
    // relative one, and an empty path an in-memory database.
    fn file_based(engine: DatabaseEngine, rest: &str) -> Self {
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
        let path = path.strip_prefix('/').unwrap_or(path);
        let name = if path.is_empty() { SQLITE_MEMORY } else { path };

        Self {
            engine,
            name: decode(name),
            user: None,
            password: None,
            host: None,
            port: None,
            options: url::form_urlencoded::parse(query.as_bytes()).into_owned().collect(),
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.engine.is_file_based() && self.name == SQLITE_MEMORY
    }
}

fn decode(value: &str) -> String {
    urlencoding::decode(value)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| value.to_string())
}
