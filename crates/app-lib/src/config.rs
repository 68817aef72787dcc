// ============================
// crates/app-lib/src/config.rs
// ============================
//! Configuration management.
use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Root directory for the local document store
    pub data_dir: PathBuf,
    /// Directory imported images are copied into
    pub media_dir: PathBuf,
    /// Directory standing in for the device gallery
    pub gallery_dir: PathBuf,
    /// Path of the persistent session slot
    pub session_file: PathBuf,
    /// Log level
    pub log_level: String,
    /// Backend connection settings
    pub backend: BackendSettings,
}

/// Connection settings for the backing document store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Project identifier
    pub project_id: String,
    /// API credential
    pub api_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            media_dir: PathBuf::from("data/media"),
            gallery_dir: PathBuf::from("gallery"),
            session_file: PathBuf::from("data/session.json"),
            log_level: "info".to_string(),
            backend: BackendSettings::default(),
        }
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            project_id: "local".to_string(),
            api_key: String::new(),
        }
    }
}

impl Settings {
    /// Load settings from `memoria.toml` and `MEMORIA_`-prefixed
    /// environment variables, on top of the defaults.
    pub fn load() -> Result<Self> {
        Self::load_from("memoria.toml")
    }

    /// Load settings with an explicit config file path.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("MEMORIA_").split("__"))
            .extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the settings for values that cannot work at runtime.
    pub fn validate(&self) -> Result<()> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.log_level.as_str()) {
            bail!("unknown log level: {}", self.log_level);
        }
        if self.data_dir.as_os_str().is_empty() {
            bail!("data_dir must not be empty");
        }
        Ok(())
    }
}
