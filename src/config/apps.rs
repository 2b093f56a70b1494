//! Installed feature modules and template engine

use serde::Serialize;

const PROJECT_APPS: [&str; 32] = [
    "zerolab.core",
    "zerolab.home",
    "zerolab.media",
    "zerolab.search",
    "wagtail.contrib.settings",
    "wagtail.embeds",
    "wagtail.sites",
    "wagtail.users",
    "wagtail.snippets",
    "wagtail.documents",
    "wagtail.images",
    "wagtail.search",
    "wagtail.admin",
    "wagtail",
    "modelcluster",
    "taggit",
    "corsheaders",
    "sri",
    "wagtail_2fa",
    "django_otp",
    "django_otp.plugins.otp_totp",
    "health_check",
    "health_check.db",
    "health_check.cache",
    "health_check.storage",
    "django.contrib.auth",
    "django.contrib.contenttypes",
    "django.contrib.sessions",
    "django.contrib.messages",
    "django.contrib.sitemaps",
    "whitenoise.runserver_nostatic",
    "django.contrib.staticfiles",
];

/// Registered by the object storage backend
pub const STORAGES_APP: &str = "storages";

/// Ordered list of installed modules
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InstalledApps(Vec<String>);

impl InstalledApps {
    pub fn new(object_storage: bool) -> Self {
        let mut apps: Vec<String> = PROJECT_APPS.iter().map(|app| app.to_string()).collect();
        if object_storage {
            apps.push(STORAGES_APP.to_string());
        }
        Self(apps)
    }

    pub fn contains(&self, app: &str) -> bool {
        self.0.iter().any(|installed| installed == app)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Template engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplatesConfig {
    pub backend: String,
    pub app_dirs: bool,
    pub context_processors: Vec<String>,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            backend: "django.template.backends.django.DjangoTemplates".to_string(),
            app_dirs: true,
            context_processors: [
                "django.template.context_processors.debug",
                "django.template.context_processors.request",
                "django.contrib.auth.context_processors.auth",
                "django.contrib.messages.context_processors.messages",
            ]
            .iter()
            .map(|processor| processor.to_string())
            .collect(),
        }
    }
}
