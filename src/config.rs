//! Server Configuration
//!
//! Read from `server.toml` next to the binary; every field has a
//! default so a missing file still boots a usable server.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// World database connection string
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Root directory for static game data tables
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_database_url() -> String {
    "sqlite:world.db?mode=rwc".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            data_dir: default_data_dir(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            warn!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {:?}: {}", path, e))?;

        toml::from_str(&content).map_err(|e| format!("Failed to parse {:?}: {}", path, e))
    }
}
