//! Persistent defaults for the dump tool and file-backed manager.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::AppError;

/// Default output directory, relative to the working directory.
fn default_output_dir() -> PathBuf {
    PathBuf::from("dump")
}

/// Default per-page worker ceiling.
fn default_concurrency() -> usize {
    helpdesk_api::config::DEFAULT_CONCURRENCY
}

/// Represents the defaults persisted on disk: helpdesk domain, agent login, output directory and worker ceiling. Secrets are never stored here.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub domain: Option<String>,
    pub user: Option<String>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for Settings {
    /// Returns baseline settings when nothing is persisted.
    fn default() -> Self {
        Self {
            domain: None,
            user: None,
            output_dir: default_output_dir(),
            concurrency: default_concurrency(),
        }
    }
}

/// Manages loading and saving of settings to a JSON file in the platform-specific config directory.
pub struct SettingsManager {
    path: PathBuf,
}

impl SettingsManager {
    /// Creates a manager bound to the platform-specific config path.
    pub fn new() -> Result<Self, AppError> {
        let dirs = directories::ProjectDirs::from("", "", "helpdesk-dumper").ok_or_else(|| {
            AppError::Settings("could not determine config directory".to_string())
        })?;
        Ok(Self::at(dirs.config_dir().join("settings.json")))
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Loads settings from disk, falling back to defaults on read/parse errors.
    pub fn load(&self) -> Settings {
        if self.path.exists() {
            let content = fs::read_to_string(&self.path).unwrap_or_default();
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            Settings::default()
        }
    }

    /// Persists settings to disk, creating parent directories when needed.
    pub fn save(&self, settings: &Settings) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}
