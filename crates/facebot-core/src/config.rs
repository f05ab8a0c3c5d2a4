//! Configuration management for facebot.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. Every section has defaults, so an empty
//! or missing file yields a runnable (passive, upload-disabled) setup.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Record store settings
    pub store: StoreConfig,
    /// Remote API gateway settings
    pub api: ApiConfig,
    /// Crawler settings
    pub crawler: CrawlerConfig,
    /// Ingestion throttle settings
    pub ingest: IngestConfig,
    /// Publisher settings
    pub publisher: PublisherConfig,
    /// Publish trigger settings
    pub schedule: ScheduleConfig,
    /// Face service settings
    pub faces: FaceServiceConfig,
    /// Admin HTTP surface settings
    pub admin: AdminConfig,
}

impl AppConfig {
    /// Load configuration from `path`, or from the default location when
    /// `path` is `None`.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file falls back to defaults.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.display().to_string(),
                    });
                }
                Self::load_from(path)
            }
            None => {
                let default_path = Self::config_path()?;
                if default_path.exists() {
                    Self::load_from(&default_path)
                } else {
                    tracing::debug!("Config file not found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse configuration from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `FACEBOT_USERNAME`: remote account username
    /// - `FACEBOT_PASSWORD`: remote account password
    /// - `FACEBOT_UPLOAD`: enable uploading (true/false)
    pub fn load_with_env(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = Self::load(path)?;
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("FACEBOT_USERNAME") {
            tracing::debug!("Override api.username from env");
            self.api.username = val;
        }

        if let Ok(val) = std::env::var("FACEBOT_PASSWORD") {
            tracing::debug!("Override api.password from env");
            self.api.password = val;
        }

        if let Ok(val) = std::env::var("FACEBOT_UPLOAD") {
            if let Ok(upload) = val.parse() {
                self.publisher.upload = upload;
                tracing::debug!("Override publisher.upload from env: {}", upload);
            }
        }
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.crawler.interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "crawler.interval_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.ingest.delay_min_secs > self.ingest.delay_max_secs {
            return Err(ConfigError::InvalidValue {
                field: "ingest.delay_min_secs".to_string(),
                reason: format!(
                    "{} is greater than ingest.delay_max_secs ({})",
                    self.ingest.delay_min_secs, self.ingest.delay_max_secs
                ),
            });
        }

        if self.schedule.post_interval_secs == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "schedule.post_interval_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.publisher.upload && self.api.username.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api.username".to_string(),
                reason: "required when publisher.upload is enabled".to_string(),
            });
        }

        Ok(())
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        tracing::debug!("Saving config to {}", path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/facebot/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "facebot", "facebot").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Record store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the `SQLite` database file
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("store.db"),
        }
    }
}

/// Remote API gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Gateway base URL
    pub base_url: String,
    /// Account username
    pub username: String,
    /// Account password (prefer `FACEBOT_PASSWORD`)
    #[serde(skip_serializing)]
    pub password: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8700".to_string(),
            username: String::new(),
            password: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Crawler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Fixed sleep between crawl iterations, in seconds
    pub interval_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self { interval_secs: 600 }
    }
}

/// Ingestion throttle settings.
///
/// The consumer sleeps a uniformly random whole number of seconds in
/// `delay_min_secs..=delay_max_secs` after each item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Lower bound of the per-item delay
    pub delay_min_secs: u64,
    /// Upper bound of the per-item delay
    pub delay_max_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            delay_min_secs: 0,
            delay_max_secs: 59,
        }
    }
}

/// Publisher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Minimum detected faces for a record to be eligible
    pub min_faces: u32,
    /// Upload rendered images to the remote account
    pub upload: bool,
    /// Follow a random follower of the credited account after uploading
    pub auto_follow: bool,
    /// Directory rendered images are written to
    pub output_dir: PathBuf,
    /// Caption file, one caption per line
    pub captions_file: Option<PathBuf>,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            min_faces: 1,
            upload: false,
            auto_follow: false,
            output_dir: PathBuf::from("output"),
            captions_file: None,
        }
    }
}

/// Publish trigger settings. See `facebot-scheduler` for precedence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Publish once at startup and exit
    pub post_now: bool,
    /// Publish on a fixed period, in seconds
    pub post_interval_secs: Option<u64>,
    /// Local times of day (`HH:MM` or `HH:MM:SS`) to publish at
    pub post_times: Vec<String>,
}

/// Face service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceServiceConfig {
    /// Face service base URL
    pub service_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FaceServiceConfig {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:8701".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Admin HTTP surface settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Serve the admin endpoints
    pub enabled: bool,
    /// Listen address
    pub bind: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}
