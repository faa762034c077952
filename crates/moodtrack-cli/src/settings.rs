//! Persistent CLI configuration.
//!
//! The API base URL resolves in precedence order: `--api-base` flag,
//! then the `MOODTRACK_API_BASE` environment variable, then the config
//! file under the platform config directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use moodtrack_core::config::{normalize_base_url, API_BASE_ENV};
use moodtrack_core::ClientConfig;

use crate::error::CliError;

const CONFIG_FILE_NAME: &str = "cli-config.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliSettings {
    #[serde(default)]
    pub api_base_url: Option<String>,
}

pub fn default_config_path() -> Result<PathBuf, CliError> {
    dirs::config_dir()
        .map(|dir| dir.join("moodtrack").join(CONFIG_FILE_NAME))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI config directory".to_string()))
}

impl CliSettings {
    pub fn load() -> Result<Self, CliError> {
        Self::load_from_path(&default_config_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|error| {
            CliError::Config(format!(
                "Failed to read config at {}: {error}",
                path.display()
            ))
        })?;
        serde_json::from_str(&raw).map_err(|error| {
            CliError::Config(format!(
                "Failed to parse config at {}: {error}",
                path.display()
            ))
        })
    }

    pub fn save(&self) -> Result<PathBuf, CliError> {
        let path = default_config_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), CliError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}

/// Resolve the backend base URL and build a validated client config.
pub fn resolve_client_config(api_base_flag: Option<&str>) -> Result<ClientConfig, CliError> {
    if let Some(base) = api_base_flag {
        return Ok(ClientConfig::new(base)?);
    }
    if std::env::var(API_BASE_ENV).is_ok_and(|value| !value.trim().is_empty()) {
        return Ok(ClientConfig::from_env()?);
    }
    if let Some(base) = CliSettings::load()?.api_base_url {
        return Ok(ClientConfig::new(base)?);
    }
    Err(CliError::Config(format!(
        "API base URL is not configured. Pass --api-base, set {API_BASE_ENV}, \
         or run `moodtrack config set-api-base <URL>`."
    )))
}

/// Validate and persist a new API base URL.
pub fn persist_api_base(url: &str) -> Result<PathBuf, CliError> {
    let normalized = normalize_base_url(url)?;
    let mut settings = CliSettings::load()?;
    settings.api_base_url = Some(normalized);
    settings.save()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn unique_config_path() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |duration| duration.as_nanos());
        std::env::temp_dir().join(format!("moodtrack-cli-config-test-{nanos}.json"))
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let path = unique_config_path();
        let settings = CliSettings::load_from_path(&path).unwrap();
        assert_eq!(settings, CliSettings::default());
    }

    #[test]
    fn settings_roundtrip_through_file() {
        let path = unique_config_path();
        let settings = CliSettings {
            api_base_url: Some("https://api.moodtrack.app".to_string()),
        };
        settings.save_to_path(&path).unwrap();

        let loaded = CliSettings::load_from_path(&path).unwrap();
        assert_eq!(loaded, settings);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn malformed_config_file_is_reported() {
        let path = unique_config_path();
        std::fs::write(&path, "not json").unwrap();

        let error = CliSettings::load_from_path(&path).unwrap_err();
        assert!(matches!(error, CliError::Config(_)));

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn flag_overrides_everything() {
        let config = resolve_client_config(Some("http://127.0.0.1:9999/")).unwrap();
        assert_eq!(config.api_base_url, "http://127.0.0.1:9999");
    }
}
