//! Static and media file storage
//!
//! Static assets are served by WhiteNoise; media uploads go to the local
//! filesystem unless an object storage bucket is configured.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use super::env::Env;

pub const BUCKET_NAME_VAR: &str = "AWS_STORAGE_BUCKET_NAME";
pub const CUSTOM_DOMAIN_VAR: &str = "AWS_S3_CUSTOM_DOMAIN";

const FILESYSTEM_STORAGE: &str = "django.core.files.storage.FileSystemStorage";
const S3_STORAGE: &str = "storages.backends.s3boto3.S3Boto3Storage";
const STATIC_STORAGE: &str = "django.contrib.staticfiles.storage.StaticFilesStorage";
const MANIFEST_STATIC_STORAGE: &str = "whitenoise.storage.CompressedManifestStaticFilesStorage";

/// Extensions WhiteNoise never compresses, already compressed formats
const WHITENOISE_SKIP_COMPRESS: [&str; 27] = [
    "jpg", "jpeg", "png", "gif", "webp", "zip", "gz", "tgz", "bz2", "tbz", "xz", "br", "swf",
    "flv", "woff", "woff2", "3gp", "3gpp", "asf", "avi", "m4v", "mov", "mp4", "mpeg", "mpg",
    "webm", "wmv",
];

/// Static file configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticFilesConfig {
    pub finders: Vec<String>,
    pub dirs: Vec<PathBuf>,
    pub root: PathBuf,
    pub url: String,
    pub storage: String,
    pub whitenoise: WhiteNoiseConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhiteNoiseConfig {
    pub allow_all_origins: bool,
    pub autorefresh: bool,
    pub skip_compress_extensions: Vec<String>,
}

impl WhiteNoiseConfig {
    pub fn should_compress(&self, file_name: &str) -> bool {
        match Path::new(file_name).extension().and_then(|ext| ext.to_str()) {
            Some(ext) => !self
                .skip_compress_extensions
                .iter()
                .any(|skip| skip.eq_ignore_ascii_case(ext)),
            None => true,
        }
    }
}

impl StaticFilesConfig {
    /// Manifest storage hashes file names, so it is only used outside debug
    pub fn new(base_dir: &Path, debug: bool) -> Self {
        let mut skip_compress_extensions: Vec<String> =
            WHITENOISE_SKIP_COMPRESS.iter().map(|ext| ext.to_string()).collect();
        skip_compress_extensions.push("map".to_string());

        Self {
            finders: vec![
                "django.contrib.staticfiles.finders.FileSystemFinder".to_string(),
                "django.contrib.staticfiles.finders.AppDirectoriesFinder".to_string(),
            ],
            dirs: vec![base_dir.join("static")],
            root: PathBuf::from("static/collected"),
            url: "static/".to_string(),
            storage: (if debug { STATIC_STORAGE } else { MANIFEST_STATIC_STORAGE }).to_string(),
            whitenoise: WhiteNoiseConfig {
                allow_all_origins: false,
                autorefresh: debug,
                skip_compress_extensions,
            },
        }
    }
}

/// S3 bucket settings, present only when a bucket name is configured
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectStorage {
    pub bucket_name: String,
    pub default_acl: String,
    pub querystring_auth: bool,
    pub file_overwrite: bool,
    pub custom_domain: Option<String>,
}

impl ObjectStorage {
    pub fn from_env(env: &Env) -> Option<Self> {
        let bucket_name = env.get(BUCKET_NAME_VAR)?.to_string();
        Some(Self {
            bucket_name,
            default_acl: "public-read".to_string(),
            querystring_auth: false,
            file_overwrite: false,
            custom_domain: env.get(CUSTOM_DOMAIN_VAR).map(str::to_string),
        })
    }

    /// Host objects are publicly served from
    pub fn public_host(&self) -> String {
        match &self.custom_domain {
            Some(domain) => domain.clone(),
            None => format!("{}.s3.amazonaws.com", self.bucket_name),
        }
    }
}

/// Media (user upload) configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaConfig {
    pub root: PathBuf,
    pub url: String,
    pub storage: String,
    pub object_storage: Option<ObjectStorage>,
}

impl MediaConfig {
    pub fn from_env(env: &Env, base_dir: &Path) -> Self {
        let object_storage = ObjectStorage::from_env(env);
        let storage = match &object_storage {
            Some(bucket) => {
                info!(
                    bucket = %bucket.bucket_name,
                    custom_domain = ?bucket.custom_domain,
                    "Using object storage for media"
                );
                S3_STORAGE
            }
            None => FILESYSTEM_STORAGE,
        };

        Self {
            root: base_dir.join("media"),
            url: "/media/".to_string(),
            storage: storage.to_string(),
            object_storage,
        }
    }

    pub fn uses_object_storage(&self) -> bool {
        self.object_storage.is_some()
    }

    /// Public URL of a stored file
    pub fn public_url(&self, name: &str) -> String {
        let name = name.trim_start_matches('/');
        match &self.object_storage {
            Some(bucket) => format!("https://{}/{}", bucket.public_host(), name),
            None => format!("{}{}", self.url, name),
        }
    }
}
