use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Environment override for the backend base URL.
pub const BASE_URL_ENV: &str = "MINDVOICE_API_BASE_URL";

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_recording_secs() -> u64 {
    120
}

/// Top-level application configuration.
///
/// Resolved once at startup via [`Config::load`] and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend base URL, e.g. "http://127.0.0.1:5000".
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeout applied to every backend request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Recording auto-stops once it reaches this duration.
    #[serde(default = "default_max_recording_secs")]
    pub max_recording_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            max_recording_secs: default_max_recording_secs(),
        }
    }
}

impl Config {
    /// Directory: ~/.config/mindvoice/
    fn dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("mindvoice");
        p
    }

    fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from disk, returning defaults if the file is missing or invalid,
    /// then apply the `MINDVOICE_API_BASE_URL` environment override.
    pub fn load() -> Self {
        let path = Self::path();
        let mut config: Self = match fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_default(),
            Err(_) => Self::default(),
        };
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.is_empty() {
                config.base_url = url;
            }
        }
        config
    }

    /// Whether a config file already exists on disk.
    pub fn on_disk() -> bool {
        Self::path().exists()
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let dir = Self::dir();
        fs::create_dir_all(&dir)?;
        let data = serde_json::to_string_pretty(self)?;
        fs::write(Self::path(), data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_recording_secs, 120);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"base_url": "http://backend:9000"}"#).unwrap();
        assert_eq!(config.base_url, "http://backend:9000");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_recording_secs, 120);
    }

    #[test]
    fn env_override_wins() {
        std::env::set_var(BASE_URL_ENV, "http://10.0.0.2:5000");
        let config = Config::load();
        assert_eq!(config.base_url, "http://10.0.0.2:5000");
        std::env::remove_var(BASE_URL_ENV);
    }
}
