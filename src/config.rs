use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::gemini;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    fn load_from(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Configuration(format!("could not read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Configuration(format!("invalid config {}: {}", path.display(), e)))
    }

    /// The credential authorizing Gemini calls, resolved once at startup.
    /// Environment wins over the config file; absence is fatal.
    pub fn credential(&self) -> Result<String, Error> {
        Self::credential_from(std::env::var(API_KEY_VAR).ok(), self.api_key.as_deref())
    }

    fn credential_from(env: Option<String>, configured: Option<&str>) -> Result<String, Error> {
        env.filter(|key| !key.is_empty())
            .or_else(|| configured.map(|key| key.to_string()))
            .ok_or_else(|| {
                Error::Configuration(format!("{} environment variable not set", API_KEY_VAR))
            })
    }

    pub fn model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string())
    }

    fn config_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Configuration("could not determine config directory".to_string()))?;
        Ok(config_dir.join("sandgen").join("config.json"))
    }
}
