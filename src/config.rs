//! Configuration for store file locations
//!
//! Configuration is stored at `~/.config/tally/config.toml`; the `TALLY_CONFIG`
//! environment variable overrides the file location. Every field has a default,
//! so a missing config file is not an error.

use crate::error::{TallyError, TallyResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Store location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the store blobs; platform data dir when unset
    pub data_dir: Option<PathBuf>,

    /// File name of the todo list blob
    pub todos_file: String,

    /// File name of the chat transcript blob
    pub chats_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            todos_file: "todos.json".to_string(),
            chats_file: "chats.json".to_string(),
        }
    }
}

impl Config {
    /// Effective data directory
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("tally")
        })
    }

    /// Path of the todo list blob
    pub fn todos_path(&self) -> PathBuf {
        self.data_dir().join(&self.todos_file)
    }

    /// Path of the chat transcript blob
    pub fn chats_path(&self) -> PathBuf {
        self.data_dir().join(&self.chats_file)
    }
}

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a config manager with the default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Default config file path, honoring the `TALLY_CONFIG` override
    pub fn default_config_path() -> PathBuf {
        if let Some(path) = std::env::var_os("TALLY_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tally")
            .join("config.toml")
    }

    /// Load configuration, falling back to defaults if no file exists
    pub async fn load(&self) -> TallyResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> TallyResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| TallyError::storage("reading config", path, e))?;

        toml::from_str(&content).map_err(|e| TallyError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Ensure the configured data directory exists
    pub async fn ensure_data_dir(config: &Config) -> TallyResult<()> {
        let dir = config.data_dir();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| TallyError::storage("creating data directory", &dir, e))
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
