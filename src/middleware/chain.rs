//! Ordered request middleware
//!
//! Requests pass through the chain top to bottom and responses bottom to
//! top, so each entry wraps everything after it. The order is fixed and
//! checked against the wrapping constraints in [`ORDERING_RULES`].

use serde::{Serialize, Serializer};
use std::fmt;
use tracing::debug;

use crate::utils::errors::{ConfigurationError, Result};

/// A single middleware in the request pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Middleware {
    GZip,
    Security,
    XFrameOptions,
    Cors,
    WhiteNoise,
    Common,
    Session,
    Csrf,
    Authentication,
    VerifyUser,
    Messages,
    Redirect,
    Csp,
    PermissionsPolicy,
}

impl Middleware {
    /// Dotted import path of the middleware class
    pub fn path(&self) -> &'static str {
        match self {
            Self::GZip => "django.middleware.gzip.GZipMiddleware",
            Self::Security => "django.middleware.security.SecurityMiddleware",
            Self::XFrameOptions => "django.middleware.clickjacking.XFrameOptionsMiddleware",
            Self::Cors => "corsheaders.middleware.CorsMiddleware",
            Self::WhiteNoise => "whitenoise.middleware.WhiteNoiseMiddleware",
            Self::Common => "django.middleware.common.CommonMiddleware",
            Self::Session => "django.contrib.sessions.middleware.SessionMiddleware",
            Self::Csrf => "django.middleware.csrf.CsrfViewMiddleware",
            Self::Authentication => "django.contrib.auth.middleware.AuthenticationMiddleware",
            Self::VerifyUser => "wagtail_2fa.middleware.VerifyUserMiddleware",
            Self::Messages => "django.contrib.messages.middleware.MessageMiddleware",
            Self::Redirect => "wagtail.contrib.redirects.middleware.RedirectMiddleware",
            Self::Csp => "csp.middleware.CSPMiddleware",
            Self::PermissionsPolicy => "django_permissions_policy.PermissionsPolicyMiddleware",
        }
    }
}

impl fmt::Display for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl Serialize for Middleware {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.path())
    }
}

/// Pairs `(outer, inner)`: `outer` must appear before `inner`.
pub const ORDERING_RULES: &[(Middleware, Middleware)] = &[
    // compressed bodies must include security headers
    (Middleware::GZip, Middleware::Security),
    (Middleware::Security, Middleware::Session),
    (Middleware::Security, Middleware::WhiteNoise),
    (Middleware::Session, Middleware::Csrf),
    (Middleware::Csrf, Middleware::Authentication),
    (Middleware::Authentication, Middleware::VerifyUser),
    (Middleware::Session, Middleware::Messages),
    // CORS headers must be added to responses short-circuited by Common
    (Middleware::Cors, Middleware::Common),
];

const DEFAULT_ORDER: [Middleware; 14] = [
    Middleware::GZip,
    Middleware::Security,
    Middleware::XFrameOptions,
    Middleware::Cors,
    Middleware::WhiteNoise,
    Middleware::Common,
    Middleware::Session,
    Middleware::Csrf,
    Middleware::Authentication,
    Middleware::VerifyUser,
    Middleware::Messages,
    Middleware::Redirect,
    Middleware::Csp,
    Middleware::PermissionsPolicy,
];

/// Validated, ordered middleware list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MiddlewareChain {
    entries: Vec<Middleware>,
}

impl MiddlewareChain {
    /// Build a chain from an explicit order, rejecting invalid orderings
    pub fn new(entries: Vec<Middleware>) -> Result<Self> {
        let chain = Self { entries };
        chain.validate()?;
        debug!(length = chain.entries.len(), "Middleware chain validated");
        Ok(chain)
    }

    /// The middleware the application ships with
    pub fn standard() -> Self {
        Self {
            entries: DEFAULT_ORDER.to_vec(),
        }
    }

    #[cfg(test)]
    pub(crate) fn unchecked(entries: Vec<Middleware>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[Middleware] {
        &self.entries
    }

    pub fn paths(&self) -> Vec<&'static str> {
        self.entries.iter().map(Middleware::path).collect()
    }

    pub fn position(&self, middleware: Middleware) -> Option<usize> {
        self.entries.iter().position(|m| *m == middleware)
    }

    pub fn contains(&self, middleware: Middleware) -> bool {
        self.position(middleware).is_some()
    }

    /// Whether `outer` runs before `inner` on the request path.
    /// `false` if either is missing.
    pub fn runs_before(&self, outer: Middleware, inner: Middleware) -> bool {
        match (self.position(outer), self.position(inner)) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        }
    }

    /// Check duplicates and the wrapping rules
    pub fn validate(&self) -> Result<()> {
        for (i, middleware) in self.entries.iter().enumerate() {
            if self.entries[..i].contains(middleware) {
                return Err(ConfigurationError::Invalid(format!(
                    "Middleware {} is listed more than once",
                    middleware
                )));
            }
        }

        for (outer, inner) in ORDERING_RULES {
            if self.contains(*outer) && self.contains(*inner) && !self.runs_before(*outer, *inner) {
                return Err(ConfigurationError::Invalid(format!(
                    "Middleware {} must come before {}",
                    outer, inner
                )));
            }
        }

        Ok(())
    }
}
