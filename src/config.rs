use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "LOUPE_CONFIG";
pub const API_URL_ENV: &str = "LOUPE_API_URL";
pub const PUBLIC_URL_ENV: &str = "LOUPE_PUBLIC_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the page backend.
    pub api_base_url: String,
    /// Base URL relative share links are resolved against.
    pub public_base_url: String,
    pub request_timeout_secs: u64,
    /// Title given to pages that never had one.
    pub default_title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            public_base_url: "http://localhost:5173".to_string(),
            request_timeout_secs: 30,
            default_title: "Untitled page".to_string(),
        }
    }
}

impl Config {
    /// Reads the config file, falling back to defaults when it does not
    /// exist. URLs may use `~` and `$VAR`.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;
        config.api_base_url = expand(&config.api_base_url);
        config.public_base_url = expand(&config.public_base_url);
        Ok(config)
    }

    /// Loads the file named by `LOUPE_CONFIG` (or the default location) and
    /// applies the URL overrides from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(Self::config_path);
        let mut config = Self::load_from_path(&config_path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|url| !url.is_empty()) {
            self.api_base_url = url;
        }
        if let Some(url) = lookup(PUBLIC_URL_ENV).filter(|url| !url.is_empty()) {
            self.public_base_url = url;
        }
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/loupe");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn expand(value: &str) -> String {
    match shellexpand::full(value) {
        Ok(expanded) => expanded.into_owned(),
        Err(_) => value.to_string(),
    }
}
