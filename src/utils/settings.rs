//! Settings and configuration utilities.
//!
//! Reads `$HOME/.shipnote/settings.json` and uses its `env` table as a
//! fallback for environment variables:
//!
//! ```json
//! { "env": { "ANTHROPIC_API_KEY": "sk-ant-...", "GITHUB_TOKEN": "gho_..." } }
//! ```

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Directory under the home directory holding the settings file.
const SETTINGS_DIR: &str = ".shipnote";

/// Settings loaded from `$HOME/.shipnote/settings.json`.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Environment variable fallbacks.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Loads settings from the default location.
    pub fn load() -> Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Self::load_from_path(&settings_path)
    }

    /// Loads settings from a specific path; a missing file yields empty settings.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        serde_json::from_str::<Self>(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Returns the default settings path.
    pub fn get_settings_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;

        Ok(home_dir.join(SETTINGS_DIR).join("settings.json"))
    }

    /// Returns an environment variable with fallback to these settings.
    pub fn get_env_var(&self, key: &str) -> Option<String> {
        env::var(key).ok().or_else(|| self.env.get(key).cloned())
    }
}

/// Returns an environment variable with fallback to the settings file.
pub fn get_env_var(key: &str) -> Result<String> {
    if let Ok(value) = env::var(key) {
        return Ok(value);
    }

    match Settings::load() {
        Ok(settings) => settings
            .env
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Environment variable not found: {}", key)),
        Err(err) => Err(anyhow::anyhow!("Environment variable not found: {}", key).context(err)),
    }
}

/// Returns the first of `keys` that resolves, with fallback to settings.
pub fn get_env_vars(keys: &[&str]) -> Result<String> {
    keys.iter()
        .find_map(|key| get_env_var(key).ok())
        .ok_or_else(|| anyhow::anyhow!("None of the environment variables found: {:?}", keys))
}

/// Returns an environment variable, or `default` when it does not resolve.
pub fn get_env_var_or(key: &str, default: &str) -> String {
    get_env_var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
