//! Configuration types for the mock server.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Listener address configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub listen: ListenConfig,

    /// Path prefix marking traffic that is answered from the stored
    /// definitions instead of the admin API.
    pub mockup_path_prefix: String,

    /// Synthesize a 200-empty definition pair for unknown mock requests
    /// instead of answering 501.
    pub auto_generate_unknown: bool,

    /// File the definition store persists to.
    pub data_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: ListenConfig::default(),
            mockup_path_prefix: "mockup".to_string(),
            auto_generate_unknown: false,
            data_file: PathBuf::from("mock-data.json"),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let prefix = self.mockup_path_prefix.trim_matches('/');
        if prefix.is_empty() {
            anyhow::bail!("'mockup_path_prefix' must not be empty");
        }
        if prefix.contains('/') || prefix.contains(char::is_whitespace) {
            anyhow::bail!(
                "'mockup_path_prefix' must be a single path segment, got '{}'",
                self.mockup_path_prefix
            );
        }
        Ok(())
    }
}
