// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Configuration is stored in `<data_dir>/config.toml` and includes:
//! - `api_url`: base URL of the REST API (e.g. `http://localhost:3000/api`)
//! - `request_timeout_secs`: bound on each API request
//! - `probe_interval_secs` / `probe_timeout_secs`: health probe cadence
//!
//! Every field has a default, so a missing file is the default config. The data
//! directory also holds the SQLite store.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Overrides the data directory.
pub const DATA_DIR_ENV: &str = "QA_DATA_DIR";
/// Overrides `api_url`.
pub const API_URL_ENV: &str = "QA_API_URL";

const APP_DIR_NAME: &str = "quickaudit";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "quickaudit.db";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}\n  hint: fix the file or remove it to use defaults", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("cannot determine a data directory\n  hint: set {DATA_DIR_ENV} or pass --data-dir")]
    NoDataDir,

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Settings read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    /// Where the config and the store live. Not serialized.
    #[serde(skip)]
    pub data_dir: PathBuf,
}

fn default_api_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_probe_interval_secs() -> u64 {
    15
}

fn default_probe_timeout_secs() -> u64 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
            probe_interval_secs: default_probe_interval_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
            data_dir: PathBuf::new(),
        }
    }
}

impl Config {
    /// Resolve the data directory: explicit path, then `QA_DATA_DIR`, then
    /// the platform's local data directory.
    pub fn resolve_data_dir(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = explicit {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        dirs::data_local_dir()
            .map(|d| d.join(APP_DIR_NAME))
            .ok_or(ConfigError::NoDataDir)
    }

    /// Load the config for `data_dir`, applying environment overrides.
    pub fn load(data_dir: &Path) -> Result<Self> {
        Self::load_file(data_dir)?.with_overrides(|key| std::env::var(key).ok())
    }

    /// Load `config.toml` from `data_dir` without looking at the environment.
    pub fn load_file(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE_NAME);
        let mut config = match fs::read_to_string(&path) {
            Ok(content) => {
                toml::from_str::<Config>(&content).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        config.data_dir = data_dir.to_path_buf();
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api_url)
            .map_err(|e| ConfigError::Invalid(format!("api_url '{}': {e}", self.api_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "api_url '{}' must be http or https",
                self.api_url
            )));
        }
        for (name, value) in [
            ("request_timeout_secs", self.request_timeout_secs),
            ("probe_interval_secs", self.probe_interval_secs),
            ("probe_timeout_secs", self.probe_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be at least 1")));
            }
        }
        Ok(())
    }

    /// Write `config.toml`, creating the data directory if needed.
    pub fn save(&self) -> Result<()> {
        let path = self.config_path();
        fs::create_dir_all(&self.data_dir).map_err(|source| ConfigError::Write {
            path: self.data_dir.clone(),
            source,
        })?;
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content).map_err(|source| ConfigError::Write { path, source })
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE_NAME)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
