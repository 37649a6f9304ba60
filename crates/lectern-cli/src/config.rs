//! CLI configuration.
//!
//! Read from `--config <path>` or `<config dir>/lectern/config.toml`. A
//! missing or empty default file means "use defaults".

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LecternConfig {
    /// Where backup envelopes are written
    pub backup_dir: Option<PathBuf>,
    /// Pretty-print written JSON
    pub pretty: bool,
    /// Console log filter used when `LECTERN_LOG` is unset
    pub log_filter: String,
    /// Back up a file before it is overwritten in place
    pub backup_before_write: bool,
}

impl Default for LecternConfig {
    fn default() -> Self {
        Self {
            backup_dir: None,
            pretty: true,
            log_filter: "info".to_string(),
            backup_before_write: true,
        }
    }
}

impl LecternConfig {
    /// `<config dir>/lectern/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lectern").join("config.toml"))
    }

    /// Loads the explicit config file, or the default one if it exists.
    ///
    /// An explicitly named file must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// The backup directory, falling back to `<data dir>/lectern/backups` and
    /// then to `./backups`.
    pub fn resolved_backup_dir(&self) -> PathBuf {
        self.backup_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("lectern").join("backups")))
            .unwrap_or_else(|| PathBuf::from("backups"))
    }
}
