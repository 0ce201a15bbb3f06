//! Persistent CLI configuration.

use std::path::{Path, PathBuf};

use reactivities_core::config::{normalize_api_url, ClientConfig, API_URL_ENV};
use reactivities_core::util::normalize_text_option;
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "cli-config.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub api_base_url: Option<String>,
}

const fn default_config_version() -> u32 {
    1
}

pub fn default_config_path() -> Result<PathBuf, String> {
    dirs::config_dir()
        .map(|dir| dir.join("reactivities").join(CONFIG_FILE_NAME))
        .ok_or_else(|| "Failed to resolve CLI config directory".to_string())
}

impl CliConfig {
    pub fn load() -> Result<Self, String> {
        Self::load_from_path(&default_config_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        let mut config = serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))?;
        config.normalize();
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf, String> {
        let path = default_config_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
    }

    /// Validate and store a new API base URL.
    pub fn set_api_base_url(&mut self, url: &str) -> Result<(), String> {
        let normalized = normalize_api_url(url).map_err(|error| error.to_string())?;
        self.api_base_url = Some(normalized);
        Ok(())
    }

    fn normalize(&mut self) {
        self.api_base_url = normalize_text_option(self.api_base_url.take());
    }
}

/// Resolve the client config: flag, then environment, then config file,
/// then the built-in default.
pub fn resolve_client_config(
    explicit: Option<&str>,
    env_value: Option<String>,
    file: &CliConfig,
) -> Result<ClientConfig, String> {
    ClientConfig::resolve([
        explicit.map(ToString::to_string),
        env_value,
        file.api_base_url.clone(),
    ])
    .map_err(|error| error.to_string())
}

pub fn load_client_config(explicit: Option<&str>) -> Result<ClientConfig, String> {
    let file = CliConfig::load()?;
    resolve_client_config(explicit, std::env::var(API_URL_ENV).ok(), &file)
}
