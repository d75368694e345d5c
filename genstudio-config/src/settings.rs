//! Read-only view of the persisted settings file.
//!
//! The settings dialog in the GUI shell owns writes; this core only reads the
//! file back when resolving credentials. Keys are stored as a flat TOML table
//! under the user's config directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

const APP_DIR: &str = "genstudio";
const KEYS_FILE: &str = "keys.toml";

#[derive(Debug, Clone, Default, Deserialize)]
struct KeysFile {
    #[serde(default)]
    api_keys: BTreeMap<String, String>,
}

/// Read-only handle on the persisted key/value settings file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store at the default per-user location, or `None` when the platform
    /// exposes no config directory.
    pub fn default_location() -> Option<Self> {
        dirs::config_dir().map(|base| Self {
            path: base.join(APP_DIR).join(KEYS_FILE),
        })
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fetch a stored API key by provider identifier. Missing file and
    /// missing key both read as `None`; a malformed file is an error.
    pub fn api_key(&self, provider: &str) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let parsed: KeysFile = toml::from_str(&raw)
            .with_context(|| format!("invalid settings file {}", self.path.display()))?;

        Ok(parsed
            .api_keys
            .get(provider)
            .filter(|value| !value.trim().is_empty())
            .cloned())
    }
}
