use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::store::{ApiKey, WeatherStore};

/// Environment variable that takes precedence over the stored API key.
pub const API_KEY_ENV: &str = "WEATHERAPI_KEY";

/// Configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// base_url = "https://api.weatherapi.com/v1/current.json"
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,

    /// Overrides the WeatherAPI.com endpoint, e.g. for a proxy.
    pub base_url: Option<String>,

    /// Default request deadline; no deadline when absent.
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "geoweather", "geoweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// The API key to use: `WEATHERAPI_KEY` if set and non-empty, else the stored one.
    pub fn resolved_api_key(&self) -> Result<ApiKey> {
        self.resolve_api_key_with(std::env::var(API_KEY_ENV).ok())
    }

    fn resolve_api_key_with(&self, env_value: Option<String>) -> Result<ApiKey> {
        let key = env_value
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.api_key.clone())
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No WeatherAPI.com API key configured.\n\
                     Hint: run `geoweather configure` or set {API_KEY_ENV}."
                )
            })?;

        Ok(ApiKey::new(key)?)
    }

    /// A fresh store carrying the resolved API key.
    pub fn store(&self) -> Result<WeatherStore> {
        Ok(WeatherStore::new(self.resolved_api_key()?))
    }

    /// `base_url`, checked to be an absolute URL.
    pub fn validated_base_url(&self) -> Result<Option<String>> {
        match &self.base_url {
            Some(url) => {
                reqwest::Url::parse(url).with_context(|| format!("Invalid base_url '{url}'"))?;
                Ok(Some(url.clone()))
            }
            None => Ok(None),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("geoweather-test-{}-{name}", std::process::id()))
            .join("config.toml")
    }

    #[test]
    fn missing_key_errors_with_hint() {
        let cfg = Config::default();
        let err = cfg.resolve_api_key_with(None).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No WeatherAPI.com API key configured"));
        assert!(msg.contains("geoweather configure"));
    }

    #[test]
    fn stored_key_is_used_without_env() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        let key = cfg.resolve_api_key_with(None).expect("key must resolve");
        assert_eq!(key.as_str(), "FILE_KEY");
    }

    #[test]
    fn env_key_overrides_stored_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        let key = cfg.resolve_api_key_with(Some("ENV_KEY".into())).unwrap();
        assert_eq!(key.as_str(), "ENV_KEY");
    }

    #[test]
    fn blank_env_key_falls_back_to_stored_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        let key = cfg.resolve_api_key_with(Some("  ".into())).unwrap();
        assert_eq!(key.as_str(), "FILE_KEY");
    }

    #[test]
    fn blank_stored_key_is_missing() {
        let cfg = Config { api_key: Some(String::new()), ..Config::default() };
        assert!(cfg.resolve_api_key_with(None).is_err());
    }

    #[test]
    fn parses_toml() {
        let cfg: Config = toml::from_str(
            r#"
            api_key = "abc"
            timeout_secs = 7
            "#,
        )
        .unwrap();

        assert_eq!(cfg.api_key.as_deref(), Some("abc"));
        assert_eq!(cfg.timeout(), Some(Duration::from_secs(7)));
        assert_eq!(cfg.validated_base_url().unwrap(), None);
    }

    #[test]
    fn save_and_load_from_path() {
        let path = temp_config_path("roundtrip");
        let cfg = Config {
            api_key: Some("abc".into()),
            base_url: Some("http://localhost:8080/v1/current.json".into()),
            timeout_secs: None,
        };

        cfg.save_to(&path).expect("save must succeed");
        let loaded = Config::load_from(&path).expect("load must succeed");
        assert_eq!(loaded, cfg);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn load_from_missing_file_returns_default() {
        let path = temp_config_path("missing");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let cfg = Config { base_url: Some("::nope".into()), ..Config::default() };
        let err = cfg.validated_base_url().unwrap_err();
        assert!(err.to_string().contains("Invalid base_url"));
    }
}
