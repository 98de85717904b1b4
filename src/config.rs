//! Application-level configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MOD_HUB_BACK_CONFIG_PATH";
/// Environment variable selecting the storage backend.
const STORAGE_BACKEND_ENV: &str = "STORAGE_BACKEND";

const DEFAULT_ADMIN_TOKEN: &str = "true";
const DEFAULT_ACTIVITY_RETENTION: usize = 100;
const DEFAULT_RECENT_ACTIVITY_LIMIT: usize = 10;
const DEFAULT_IMAGE_URL_BASE: &str = "https://example.com/images";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Value the `X-Admin-Auth` header must carry on admin routes.
    pub admin_token: String,
    /// Maximum number of activity entries kept in storage.
    pub activity_retention: usize,
    /// Number of activity entries returned by the admin listing.
    pub recent_activity_limit: usize,
    /// Prefix of the placeholder URL assigned to uploaded images.
    pub image_url_base: String,
    /// Largest accepted upload request body, in bytes.
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        activity_retention = app_config.activity_retention,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Placeholder URL of the image with the given id.
    pub fn image_url(&self, id: &str) -> String {
        format!("{}/{}", self.image_url_base.trim_end_matches('/'), id)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            admin_token: DEFAULT_ADMIN_TOKEN.into(),
            activity_retention: DEFAULT_ACTIVITY_RETENTION,
            recent_activity_limit: DEFAULT_RECENT_ACTIVITY_LIMIT,
            image_url_base: DEFAULT_IMAGE_URL_BASE.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
///
/// Every key is optional; missing keys keep their built-in default.
struct RawConfig {
    admin_token: Option<String>,
    activity_retention: Option<usize>,
    recent_activity_limit: Option<usize>,
    image_url_base: Option<String>,
    max_upload_bytes: Option<usize>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            admin_token: value.admin_token.unwrap_or(defaults.admin_token),
            activity_retention: value
                .activity_retention
                .unwrap_or(defaults.activity_retention),
            recent_activity_limit: value
                .recent_activity_limit
                .unwrap_or(defaults.recent_activity_limit),
            image_url_base: value.image_url_base.unwrap_or(defaults.image_url_base),
            max_upload_bytes: value.max_upload_bytes.unwrap_or(defaults.max_upload_bytes),
        }
    }
}

/// Storage backend selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process-local store; data is lost on restart.
    Memory,
    /// CouchDB server reached over HTTP.
    #[cfg(feature = "couch-store")]
    Couch,
}

impl StorageBackend {
    /// Read the backend from `STORAGE_BACKEND`, defaulting to CouchDB when compiled in.
    pub fn from_env() -> Self {
        match env::var(STORAGE_BACKEND_ENV) {
            Ok(value) => Self::parse(&value).unwrap_or_else(|| {
                warn!(value = %value, "unknown storage backend; using default");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            #[cfg(feature = "couch-store")]
            "couch" | "couchdb" => Some(Self::Couch),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            #[cfg(feature = "couch-store")]
            Self::Couch => "couch",
        }
    }
}

impl Default for StorageBackend {
    fn default() -> Self {
        #[cfg(feature = "couch-store")]
        {
            Self::Couch
        }
        #[cfg(not(feature = "couch-store"))]
        {
            Self::Memory
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
