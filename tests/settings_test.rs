//! Settings derivation tests
//!
//! Covers the coupled debug switches, object storage activation, defaults
//! and determinism of the loader.

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use proptest::prelude::*;
use std::path::Path;
use zerolab::config::{CacheBackend, DatabaseEngine};
use zerolab::{ConfigurationError, Middleware, Settings};

#[test]
fn test_missing_secret_key_fails() {
    let result = load(&[("DEBUG", "true")]);
    assert_matches!(
        result,
        Err(ConfigurationError::MissingVariable { ref name }) if name == "SECRET_KEY"
    );
}

#[test]
fn test_present_secret_key_succeeds() {
    let settings = load(&[("SECRET_KEY", "s3cr3t")]).unwrap();
    assert_eq!(settings.secret_key.expose(), "s3cr3t");
}

#[test]
fn test_boolean_defaults_when_absent() {
    let settings = load_with_secret(&[]);
    assert!(!settings.debug);
    assert!(!settings.security.hsts.include_subdomains);
}

#[test]
fn test_debug_couples_security_switches() {
    let settings = load_with_secret(&[("DEBUG", "true")]);

    assert_eq!(settings.allowed_hosts, vec!["*"]);
    assert!(!settings.security.cookies.session_cookie_secure);
    assert!(!settings.security.cookies.csrf_cookie_secure);
    assert_eq!(settings.security.cors.allowed_origins, vec!["https://zerolab.org"]);
    assert!(!settings.security.cors.allow_all_origins);
    assert!(!settings.security.ssl_redirect.enabled);
    assert_eq!(settings.security.hsts.seconds, 0);
    assert!(!settings.security.csp.block_all_mixed_content);
    assert!(!settings.security.csp.upgrade_insecure_requests);
    assert!(!settings.security.two_factor_required);
    assert!(settings.static_files.whitenoise.autorefresh);
    assert_eq!(
        settings.static_files.storage,
        "django.contrib.staticfiles.storage.StaticFilesStorage"
    );
}

#[test]
fn test_production_is_strict() {
    let settings = load_with_secret(&[("DEBUG", "False")]);

    assert!(settings.allowed_hosts.is_empty());
    assert!(settings.security.cookies.session_cookie_secure);
    assert!(settings.security.cookies.csrf_cookie_secure);
    assert!(settings.security.ssl_redirect.enabled);
    assert!(settings.security.hsts.preload);
    assert!(settings.security.csp.block_all_mixed_content);
    assert!(settings.security.csp.upgrade_insecure_requests);
    assert!(settings.security.two_factor_required);
    assert_eq!(
        settings.static_files.storage,
        "whitenoise.storage.CompressedManifestStaticFilesStorage"
    );
}

#[test]
fn test_allowed_hosts_from_env_in_production() {
    let settings = load_with_secret(&[("ALLOWED_HOSTS", "zerolab.org,www.zerolab.org")]);
    assert_eq!(settings.allowed_hosts, vec!["zerolab.org", "www.zerolab.org"]);
    assert!(settings.is_host_allowed("www.zerolab.org"));
    assert!(!settings.is_host_allowed("example.com"));
    assert!(settings.is_host_allowed("zerolab.org:8000"));
}

#[test]
fn test_ipv6_hosts() {
    let settings = load_with_secret(&[("ALLOWED_HOSTS", "::1,[::1]")]);
    assert!(settings.is_host_allowed("::1"));
    assert!(settings.is_host_allowed("[::1]:8000"));
    assert!(!settings.is_host_allowed("::"));
}

#[test]
fn test_example_scenario() {
    let settings = load(&[
        ("SECRET_KEY", "x"),
        ("DEBUG", "False"),
        ("BASE_HOSTNAME", "example.com"),
    ])
    .unwrap();

    assert_eq!(settings.cms.admin_base_url, "https://example.com");
    assert!(settings.security.ssl_redirect.enabled);
    assert_eq!(settings.security.hsts.seconds, 2_592_000);
    assert_eq!(settings.security.cors.allowed_origins, vec!["https://example.com"]);
    assert!(settings.security.cors.allow_all_origins);
    assert!(settings.security.cors.allows_origin("https://example.com"));
}

#[test]
fn test_debug_cors_uses_base_hostname() {
    let settings = load_with_secret(&[("DEBUG", "1"), ("BASE_HOSTNAME", "example.com")]);
    assert_eq!(settings.security.cors.allowed_origins, vec!["https://example.com"]);
}

#[test]
fn test_object_storage_activation() {
    let settings = load_with_secret(&[
        ("AWS_STORAGE_BUCKET_NAME", "zerolab-media"),
        ("AWS_S3_CUSTOM_DOMAIN", "media.zerolab.org"),
    ]);

    let bucket = settings.media.object_storage.as_ref().expect("object storage");
    assert_eq!(settings.media.storage, "storages.backends.s3boto3.S3Boto3Storage");
    assert_eq!(bucket.bucket_name, "zerolab-media");
    assert_eq!(bucket.default_acl, "public-read");
    assert!(!bucket.querystring_auth);
    assert!(!bucket.file_overwrite);
    assert_eq!(bucket.custom_domain.as_deref(), Some("media.zerolab.org"));
    assert!(settings.installed_apps.contains("storages"));
}

#[test]
fn test_empty_bucket_name_still_activates_object_storage() {
    let settings = load(&[("SECRET_KEY", "x"), ("AWS_STORAGE_BUCKET_NAME", "")]).unwrap();

    let bucket = settings.media.object_storage.as_ref().expect("object storage");
    assert_eq!(bucket.bucket_name, "");
    assert_eq!(settings.media.storage, "storages.backends.s3boto3.S3Boto3Storage");
    assert!(settings.installed_apps.contains("storages"));
}

#[test]
fn test_filesystem_media_by_default() {
    let settings = load_with_secret(&[]);
    assert!(settings.media.object_storage.is_none());
    assert_eq!(settings.media.storage, "django.core.files.storage.FileSystemStorage");
    assert_eq!(settings.media.root, Path::new(TEST_BASE_DIR).join("media"));
    assert!(!settings.installed_apps.contains("storages"));
}

#[test]
fn test_database_and_cache_urls() {
    let settings = load_with_secret(&[
        ("DATABASE_URL", "postgres://zero@db:5432/zerolab"),
        ("CACHE_URL", "redis://cache:6379/0"),
        ("RENDITION_CACHE_URL", "filecache:///var/cache/renditions"),
    ]);
    assert_eq!(settings.databases.default.engine, DatabaseEngine::Postgresql);
    assert_eq!(settings.caches.default.backend, CacheBackend::Redis);
    assert_eq!(settings.caches.renditions.backend, CacheBackend::FileBased);
    assert_eq!(
        settings.caches.renditions.location.as_deref(),
        Some("/var/cache/renditions")
    );
}

#[test]
fn test_bad_database_url_fails() {
    assert_matches!(
        load(&[("SECRET_KEY", "x"), ("DATABASE_URL", "cassandra://db/zerolab")]),
        Err(ConfigurationError::UnsupportedScheme { ref name, .. }) if name == "DATABASE_URL"
    );
}

#[test]
fn test_middleware_order() {
    let settings = load_with_secret(&[]);
    let chain = &settings.middleware;
    assert!(chain.runs_before(Middleware::GZip, Middleware::Security));
    assert!(chain.runs_before(Middleware::Security, Middleware::Session));
    assert!(chain.runs_before(Middleware::Session, Middleware::Csrf));
    assert!(chain.runs_before(Middleware::Csrf, Middleware::Authentication));
}

#[test]
fn test_secret_not_leaked() {
    let settings = load(&[("SECRET_KEY", "do-not-print-me")]).unwrap();
    assert!(!format!("{:?}", settings).contains("do-not-print-me"));
    assert!(!serde_json::to_string(&settings).unwrap().contains("do-not-print-me"));
}

#[test]
fn test_settings_render_as_toml() {
    let settings = load_with_secret(&[("AWS_STORAGE_BUCKET_NAME", "b")]);
    let rendered = toml::to_string(&settings).unwrap();
    assert!(rendered.contains("zerolab.org"));
}

#[test]
fn test_settings_are_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Settings>();
}

fn boolean_spelling() -> impl Strategy<Value = (String, bool)> {
    prop_oneof![
        prop::sample::select(vec!["true", "True", "on", "YES", "y", "1", "ok"])
            .prop_map(|s| (s.to_string(), true)),
        prop::sample::select(vec!["false", "False", "off", "NO", "n", "0", ""])
            .prop_map(|s| (s.to_string(), false)),
    ]
}

proptest! {
    #[test]
    fn prop_debug_spellings((raw, expected) in boolean_spelling()) {
        let settings = load_with_secret(&[("DEBUG", raw.as_str())]);
        prop_assert_eq!(settings.debug, expected);
        prop_assert_eq!(settings.security.ssl_redirect.enabled, !expected);
    }

    #[test]
    fn prop_loading_is_idempotent(
        debug in any::<bool>(),
        hosts in prop::collection::vec("[a-z]{1,8}\\.example", 0..4),
        hostname in "[a-z]{1,10}\\.org",
        bucket in prop::option::of("[a-z]{3,12}"),
    ) {
        let hosts = hosts.join(",");
        let debug = if debug { "true" } else { "false" };
        let mut vars = vec![
            ("SECRET_KEY", "k"),
            ("DEBUG", debug),
            ("ALLOWED_HOSTS", hosts.as_str()),
            ("BASE_HOSTNAME", hostname.as_str()),
        ];
        if let Some(bucket) = &bucket {
            vars.push(("AWS_STORAGE_BUCKET_NAME", bucket.as_str()));
        }

        let first = load(&vars).unwrap();
        let second = load(&vars).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn prop_unrelated_variables_are_ignored(name in "UNRELATED_[A-Z]{1,8}", value in ".*") {
        let baseline = load_with_secret(&[]);
        let settings = load_with_secret(&[(name.as_str(), value.as_str())]);
        prop_assert_eq!(baseline, settings);
    }
}
