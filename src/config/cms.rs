//! Page management layer settings

use serde::Serialize;
use std::collections::BTreeMap;

pub const SITE_NAME: &str = "zerolab.org";

/// Search index backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchBackend {
    pub backend: String,
    pub auto_update: bool,
    pub atomic_rebuild: bool,
}

/// Admin features switched off for a single-editor site
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminFeatures {
    pub update_check: bool,
    pub password_reset: bool,
    pub workflow: bool,
    pub moderation: bool,
    pub whats_new_banner: bool,
}

/// CMS configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmsConfig {
    pub site_name: String,
    pub admin_base_url: String,
    pub search_backends: BTreeMap<String, SearchBackend>,
    pub features: AdminFeatures,
    pub document_model: String,
    pub image_model: String,
    /// Source format to stored format for uploaded images
    pub image_format_conversions: BTreeMap<String, String>,
    pub redirects_file_storage: String,
    pub default_auto_field: String,
}

impl CmsConfig {
    pub fn new(base_hostname: &str) -> Self {
        let search_backends = BTreeMap::from([(
            "default".to_string(),
            SearchBackend {
                backend: "wagtail.search.backends.database".to_string(),
                auto_update: true,
                atomic_rebuild: true,
            },
        )]);

        let image_format_conversions = ["webp", "jpeg", "png"]
            .iter()
            .map(|format| (format.to_string(), "webp".to_string()))
            .collect();

        Self {
            site_name: SITE_NAME.to_string(),
            admin_base_url: admin_base_url(base_hostname),
            search_backends,
            features: AdminFeatures {
                update_check: false,
                password_reset: false,
                workflow: false,
                moderation: false,
                whats_new_banner: false,
            },
            document_model: "media.CustomDocument".to_string(),
            image_model: "media.CustomImage".to_string(),
            image_format_conversions,
            redirects_file_storage: "cache".to_string(),
            default_auto_field: "django.db.models.AutoField".to_string(),
        }
    }

    /// Output format for an uploaded image; unlisted formats are kept
    pub fn convert_format<'a>(&'a self, format: &'a str) -> &'a str {
        let key = format.to_ascii_lowercase();
        self.image_format_conversions
            .get(key.as_str())
            .map(String::as_str)
            .unwrap_or(format)
    }
}

/// Admin base URL for a hostname
pub fn admin_base_url(base_hostname: &str) -> String {
    format!("https://{}", base_hostname)
}
