//! Security policy
//!
//! Everything here is derived from the debug flag, which couples cookie
//! security, HTTPS redirection, HSTS, CSP hardening, CORS and the
//! two-factor requirement. Production is the strict side of every switch.

use regex::Regex;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

use super::env::Env;
use crate::utils::errors::{ConfigurationError, Result};

/// 30 days
pub const HSTS_SECONDS: u64 = 2_592_000;

/// About a month
pub const SESSION_COOKIE_AGE: u64 = 2_419_200;

/// Paths under `-/` serve internal health and status endpoints
pub const REDIRECT_EXEMPT_PATTERNS: [&str; 1] = [r"^-/"];

pub const PERMISSIONS_POLICY_FEATURES: [&str; 16] = [
    "accelerometer",
    "ambient-light-sensor",
    "autoplay",
    "camera",
    "display-capture",
    "document-domain",
    "encrypted-media",
    "fullscreen",
    "geolocation",
    "gyroscope",
    "interest-cohort",
    "magnetometer",
    "microphone",
    "midi",
    "payment",
    "usb",
];

/// Cross-origin resource sharing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_all_origins: bool,
}

impl CorsConfig {
    pub fn allows_origin(&self, origin: &str) -> bool {
        self.allow_all_origins || self.allowed_origins.iter().any(|allowed| allowed == origin)
    }
}

/// Content security policy flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CspConfig {
    /// Unset so remote content is not blocked wholesale
    pub default_src: Option<Vec<String>>,
    pub block_all_mixed_content: bool,
    pub upgrade_insecure_requests: bool,
}

impl CspConfig {
    /// `Content-Security-Policy` header value, if any directive is set
    pub fn header_value(&self) -> Option<String> {
        let mut directives = Vec::new();
        if let Some(sources) = &self.default_src {
            directives.push(format!("default-src {}", sources.join(" ")));
        }
        if self.block_all_mixed_content {
            directives.push("block-all-mixed-content".to_string());
        }
        if self.upgrade_insecure_requests {
            directives.push("upgrade-insecure-requests".to_string());
        }

        if directives.is_empty() {
            None
        } else {
            Some(directives.join("; "))
        }
    }
}

/// HTTP Strict Transport Security
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HstsConfig {
    pub seconds: u64,
    pub include_subdomains: bool,
    pub preload: bool,
}

impl HstsConfig {
    pub fn disabled() -> Self {
        Self {
            seconds: 0,
            include_subdomains: false,
            preload: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.seconds > 0
    }

    /// `Strict-Transport-Security` header value, `None` when disabled
    pub fn header_value(&self) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }
        let mut value = format!("max-age={}", self.seconds);
        if self.include_subdomains {
            value.push_str("; includeSubDomains");
        }
        if self.preload {
            value.push_str("; preload");
        }
        Some(value)
    }
}

/// Compiled redirect exemption patterns
#[derive(Debug, Clone, Default)]
pub struct RedirectExemptions(Vec<Regex>);

impl RedirectExemptions {
    pub fn compile(patterns: &[&str]) -> Result<Self> {
        patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ConfigurationError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// Patterns are matched against the path without its leading slashes
    pub fn is_exempt(&self, path: &str) -> bool {
        let path = path.trim_start_matches('/');
        self.0.iter().any(|pattern| pattern.is_match(path))
    }

    pub fn patterns(&self) -> Vec<&str> {
        self.0.iter().map(Regex::as_str).collect()
    }
}

impl PartialEq for RedirectExemptions {
    fn eq(&self, other: &Self) -> bool {
        self.patterns() == other.patterns()
    }
}

impl Eq for RedirectExemptions {}

impl Serialize for RedirectExemptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.patterns())
    }
}

/// HTTP to HTTPS redirection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SslRedirectConfig {
    pub enabled: bool,
    pub exempt: RedirectExemptions,
}

/// Session and CSRF cookie flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CookiePolicy {
    pub session_cookie_secure: bool,
    pub session_cookie_httponly: bool,
    pub session_cookie_age: u64,
    pub csrf_cookie_secure: bool,
    pub csrf_cookie_httponly: bool,
}

/// Header set by a TLS-terminating proxy to mark secure requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxySslHeader {
    pub header: String,
    pub value: String,
}

impl ProxySslHeader {
    pub fn is_secure(&self, header_value: Option<&str>) -> bool {
        header_value.map(str::trim) == Some(self.value.as_str())
    }
}

/// Feature permissions, feature name to allow-list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PermissionsPolicy(BTreeMap<String, Vec<String>>);

impl PermissionsPolicy {
    /// Every known feature disabled for every origin
    pub fn deny_all() -> Self {
        Self(
            PERMISSIONS_POLICY_FEATURES
                .iter()
                .map(|feature| (feature.to_string(), Vec::new()))
                .collect(),
        )
    }

    pub fn allow_list(&self, feature: &str) -> Option<&[String]> {
        self.0.get(feature).map(Vec::as_slice)
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Permissions-Policy` header value
    pub fn header_value(&self) -> String {
        self.0
            .iter()
            .map(|(feature, allow)| {
                let origins: Vec<String> = allow
                    .iter()
                    .map(|origin| match origin.as_str() {
                        "self" | "*" => origin.clone(),
                        _ => format!("\"{}\"", origin),
                    })
                    .collect();
                format!("{}=({})", feature, origins.join(" "))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Complete security policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityConfig {
    pub cors: CorsConfig,
    pub csp: CspConfig,
    pub hsts: HstsConfig,
    pub ssl_redirect: SslRedirectConfig,
    pub cookies: CookiePolicy,
    pub browser_xss_filter: bool,
    pub content_type_nosniff: bool,
    pub x_frame_options: String,
    pub referrer_policy: String,
    pub proxy_ssl_header: ProxySslHeader,
    pub permissions_policy: PermissionsPolicy,
    pub two_factor_required: bool,
}

impl SecurityConfig {
    /// Derive the policy. `SECURE_HSTS_INCLUDE_SUBDOMAINS` is only read
    /// outside debug mode.
    pub fn from_env(env: &Env, debug: bool, admin_base_url: &str) -> Result<Self> {
        let (cors, csp, hsts, ssl_redirect) = if debug {
            (
                CorsConfig {
                    allowed_origins: vec![admin_base_url.to_string()],
                    allow_all_origins: false,
                },
                CspConfig {
                    default_src: None,
                    block_all_mixed_content: false,
                    upgrade_insecure_requests: false,
                },
                HstsConfig::disabled(),
                SslRedirectConfig {
                    enabled: false,
                    exempt: RedirectExemptions::default(),
                },
            )
        } else {
            (
                CorsConfig {
                    allowed_origins: vec![admin_base_url.to_string()],
                    allow_all_origins: true,
                },
                CspConfig {
                    default_src: None,
                    block_all_mixed_content: true,
                    upgrade_insecure_requests: true,
                },
                HstsConfig {
                    seconds: HSTS_SECONDS,
                    include_subdomains: env.bool_or("SECURE_HSTS_INCLUDE_SUBDOMAINS", false)?,
                    preload: true,
                },
                SslRedirectConfig {
                    enabled: true,
                    exempt: RedirectExemptions::compile(&REDIRECT_EXEMPT_PATTERNS)?,
                },
            )
        };

        Ok(Self {
            cors,
            csp,
            hsts,
            ssl_redirect,
            cookies: CookiePolicy {
                session_cookie_secure: !debug,
                session_cookie_httponly: true,
                session_cookie_age: SESSION_COOKIE_AGE,
                csrf_cookie_secure: !debug,
                csrf_cookie_httponly: true,
            },
            browser_xss_filter: true,
            content_type_nosniff: true,
            x_frame_options: "DENY".to_string(),
            referrer_policy: "same-origin".to_string(),
            proxy_ssl_header: ProxySslHeader {
                header: "X-Forwarded-Proto".to_string(),
                value: "https".to_string(),
            },
            permissions_policy: PermissionsPolicy::deny_all(),
            two_factor_required: !debug,
        })
    }

    /// Whether a plain-HTTP request for `path` gets redirected to HTTPS
    pub fn requires_https_redirect(&self, path: &str, is_secure: bool) -> bool {
        self.ssl_redirect.enabled && !is_secure && !self.ssl_redirect.exempt.is_exempt(path)
    }

    /// Headers the middleware chain adds to a response
    pub fn response_headers(&self, is_secure: bool) -> Vec<(&'static str, String)> {
        let mut headers = Vec::new();

        if is_secure {
            if let Some(value) = self.hsts.header_value() {
                headers.push(("Strict-Transport-Security", value));
            }
        }
        if self.content_type_nosniff {
            headers.push(("X-Content-Type-Options", "nosniff".to_string()));
        }
        if self.browser_xss_filter {
            headers.push(("X-XSS-Protection", "1; mode=block".to_string()));
        }
        headers.push(("Referrer-Policy", self.referrer_policy.clone()));
        headers.push(("X-Frame-Options", self.x_frame_options.clone()));
        if let Some(value) = self.csp.header_value() {
            headers.push(("Content-Security-Policy", value));
        }
        headers.push(("Permissions-Policy", self.permissions_policy.header_value()));

        headers
    }
}
