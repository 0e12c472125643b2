//! Client configuration persisted as JSON in the user's config directory.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::domain::StartDay;
use crate::errors::ConfigError;
use crate::mutation::InFlightPolicy;

const CONFIG_FILE: &str = "config.json";
const APP_DIR: &str = "budget_client";
const TMP_SUFFIX: &str = "tmp";

/// Whether a successful mutation is followed by a fresh listing that
/// replaces the optimistic guess.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RefreshPolicy {
    pub create_account: bool,
    pub update_account: bool,
    pub delete_account: bool,
    pub create_category: bool,
    pub update_category: bool,
    pub delete_category: bool,
    /// Recording a transaction changes an account balance and a category
    /// spend on the server, so this refreshes both collections.
    pub record_transaction: bool,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            create_account: false,
            update_account: true,
            delete_account: false,
            create_category: false,
            update_category: true,
            delete_category: false,
            record_transaction: true,
        }
    }
}

impl RefreshPolicy {
    /// Refreshes after every mutation.
    pub fn always() -> Self {
        Self {
            create_account: true,
            update_account: true,
            delete_account: true,
            create_category: true,
            update_category: true,
            delete_category: true,
            record_transaction: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL transport adapters resolve operation routes against.
    pub base_url: String,
    pub in_flight_policy: InFlightPolicy,
    pub refresh: RefreshPolicy,
    /// Start day shown until the server value has been loaded.
    pub default_start_day: StartDay,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".into(),
            in_flight_policy: InFlightPolicy::default(),
            refresh: RefreshPolicy::default(),
            default_start_day: StartDay::DEFAULT,
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url must not be empty".into()));
        }
        Ok(())
    }

    /// Joins an operation path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Loads and saves [`ClientConfig`] under a base directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Uses `<user config dir>/budget_client`.
    pub fn new() -> Result<Self, ConfigError> {
        let base = default_base_dir().ok_or_else(|| {
            ConfigError::Invalid("no user configuration directory available".into())
        })?;
        Self::with_base_dir(base)
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        Ok(Self {
            config_path: base.join(CONFIG_FILE),
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Returns the stored configuration, or the defaults when none exists.
    pub fn load(&self) -> Result<ClientConfig, ConfigError> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "no config file, using defaults");
            return Ok(ClientConfig::default());
        }
        let data = fs::read_to_string(&self.config_path)?;
        let config: ClientConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &ClientConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.config_path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.config_path)?;
        Ok(())
    }
}

pub fn default_base_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
