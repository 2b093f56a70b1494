//! Cache backend descriptors
//!
//! Two named caches are configured: `default` for general use and
//! `renditions` for generated image derivatives.

use serde::Serialize;
use std::collections::BTreeMap;
use url::Url;

use crate::utils::errors::{ConfigurationError, Result};

/// Cache backend selected by the URL scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    Dummy,
    LocMem,
    FileBased,
    Database,
    Redis,
    PyMemcache,
    PyLibMc,
}

impl CacheBackend {
    fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "dummycache" => Some(Self::Dummy),
            "locmemcache" => Some(Self::LocMem),
            "filecache" => Some(Self::FileBased),
            "dbcache" => Some(Self::Database),
            "rediscache" | "redis" | "rediss" => Some(Self::Redis),
            "memcache" | "pymemcache" => Some(Self::PyMemcache),
            "pylibmc" => Some(Self::PyLibMc),
            _ => None,
        }
    }

    /// Import path of the framework cache backend
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Dummy => "django.core.cache.backends.dummy.DummyCache",
            Self::LocMem => "django.core.cache.backends.locmem.LocMemCache",
            Self::FileBased => "django.core.cache.backends.filebased.FileBasedCache",
            Self::Database => "django.core.cache.backends.db.DatabaseCache",
            Self::Redis => "django.core.cache.backends.redis.RedisCache",
            Self::PyMemcache => "django.core.cache.backends.memcached.PyMemcacheCache",
            Self::PyLibMc => "django.core.cache.backends.memcached.PyLibMCCache",
        }
    }

    /// Whether the backend keeps anything at all
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::Dummy)
    }
}

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub location: Option<String>,
    pub options: BTreeMap<String, String>,
}

/// Named cache configurations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caches {
    pub default: CacheConfig,
    pub renditions: CacheConfig,
}

impl CacheConfig {
    /// Parse a cache URL. `name` is the variable it came from, for errors.
    pub fn parse(name: &str, raw: &str) -> Result<Self> {
        let (scheme, rest) = raw.split_once("://").unwrap_or((raw, ""));
        let backend = CacheBackend::from_scheme(scheme).ok_or_else(|| {
            ConfigurationError::UnsupportedScheme {
                name: name.to_string(),
                scheme: scheme.to_string(),
            }
        })?;

        let (target, query) = rest.split_once('?').unwrap_or((rest, ""));
        let options = url::form_urlencoded::parse(query.as_bytes()).into_owned().collect();

        let location = match backend {
            CacheBackend::Dummy => None,
            CacheBackend::Redis => {
                let scheme = if scheme == "rediss" { "rediss" } else { "redis" };
                let location = format!("{scheme}://{target}");
                Url::parse(&location).map_err(|source| ConfigurationError::InvalidUrl {
                    name: name.to_string(),
                    source,
                })?;
                Some(location)
            }
            CacheBackend::PyMemcache | CacheBackend::PyLibMc if target.starts_with('/') => {
                Some(format!("unix:{target}"))
            }
            _ => Some(target.to_string()).filter(|location| !location.is_empty()),
        };

        Ok(Self { backend, location, options })
    }

    /// Individual locations, for backends that accept several servers
    pub fn locations(&self) -> Vec<&str> {
        match (&self.backend, &self.location) {
            (CacheBackend::PyMemcache | CacheBackend::PyLibMc, Some(location)) => {
                location.split(',').map(str::trim).filter(|l| !l.is_empty()).collect()
            }
            (_, Some(location)) => vec![location.as_str()],
            (_, None) => Vec::new(),
        }
    }
}
