use super::calculation::CalculationRequest;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// Environment variable consulted before the configured API key.
pub const API_KEY_ENV: &str = "TWELVE_DATA_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct TwelveDataConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub base: String,
    pub quote: String,
    pub outputsize: u32,
    pub timeout_secs: u64,
}

impl Default for TwelveDataConfig {
    fn default() -> Self {
        TwelveDataConfig {
            base_url: "https://api.twelvedata.com".to_string(),
            api_key: None,
            base: "USD".to_string(),
            quote: "TRY".to_string(),
            outputsize: 90,
            timeout_secs: 10,
        }
    }
}

impl TwelveDataConfig {
    /// The API key from the environment, else from the config file.
    /// Blank values count as missing.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_with_env(std::env::var(API_KEY_ENV).ok())
    }

    /// Like [`Self::api_key`], with the environment value passed in.
    pub fn api_key_with_env(&self, from_env: Option<String>) -> Option<String> {
        pick_api_key(from_env, self.api_key.clone())
    }
}

fn pick_api_key(from_env: Option<String>, configured: Option<String>) -> Option<String> {
    [from_env, configured]
        .into_iter()
        .flatten()
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub twelve_data: TwelveDataConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub data_path: Option<String>,
    /// Request used by `calculate` when no request file is given
    #[serde(default)]
    pub defaults: CalculationRequest,
}

impl AppConfig {
    /// Loads the config from the default location, or built-in defaults if
    /// no file has been set up yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "tierfx", "tierfx")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "tierfx", "tierfx")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
