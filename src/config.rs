// ⚙️ Configuration - JSON file with defaults for every field

use crate::birth::BirthForm;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV_VAR: &str = "MYSTIC_COMPANION_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Pre-filled form values
    pub defaults: BirthForm,

    /// Where chat exports are written
    pub export_dir: PathBuf,

    /// Bind address for the web server
    pub server_addr: String,

    /// Fixed chat flavor seed; None derives one from the birth record
    pub flavor_seed: Option<u64>,

    /// Directory for the TUI log file
    pub log_dir: PathBuf,

    /// tracing filter used when RUST_LOG is not set
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            defaults: BirthForm::default(),
            export_dir: PathBuf::from("exports"),
            server_addr: "127.0.0.1:3000".to_string(),
            flavor_seed: None,
            log_dir: PathBuf::from("logs"),
            log_filter: "mystic_companion=info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load config from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config JSON: {:?}", path.as_ref()))
    }

    /// Explicit path first, then the environment variable, then defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_file(PathBuf::from(path)),
            None => Ok(Self::default()),
        }
    }
}
