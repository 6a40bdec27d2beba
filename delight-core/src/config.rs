use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{DelightError, DelightResult};
use crate::request::DEFAULT_MESSAGE_ID_PREFIX;

pub const DEFAULT_BASE_URL: &str = "https://qa.delight.global";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DelightConfig {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Everything a [`crate::DelightClient`] needs besides its transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    #[serde(default)]
    pub retry_transient_errors: bool,

    #[serde(default)]
    pub deadline_secs: Option<u64>,

    #[serde(default = "default_message_id_prefix")]
    pub message_id_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_format: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_message_id_prefix() -> String {
    DEFAULT_MESSAGE_ID_PREFIX.to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            max_attempts: default_max_attempts(),
            poll_interval_ms: default_poll_interval(),
            retry_transient_errors: false,
            deadline_secs: None,
            message_id_prefix: default_message_id_prefix(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl ClientConfig {
    /// The stock configuration pointing at the hosted QA environment.
    pub fn default_config() -> Self {
        Self::default()
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> DelightResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(DelightError::InvalidConfigValue {
                key: "client.base_url".to_string(),
                message: "Must not be empty".to_string(),
            });
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(DelightError::InvalidConfigValue {
                key: "client.base_url".to_string(),
                message: "Must start with http:// or https://".to_string(),
            });
        }

        if self.max_attempts == 0 {
            return Err(DelightError::InvalidConfigValue {
                key: "client.max_attempts".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.poll_interval_ms == 0 {
            return Err(DelightError::InvalidConfigValue {
                key: "client.poll_interval_ms".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.request_timeout_secs == 0 {
            return Err(DelightError::InvalidConfigValue {
                key: "client.request_timeout_secs".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.deadline_secs == Some(0) {
            return Err(DelightError::InvalidConfigValue {
                key: "client.deadline_secs".to_string(),
                message: "Must be greater than 0 when set".to_string(),
            });
        }

        Ok(())
    }
}

impl DelightConfig {
    pub fn load() -> DelightResult<Self> {
        Self::load_from_paths(get_config_paths())
    }

    pub fn load_from_paths(paths: Vec<PathBuf>) -> DelightResult<Self> {
        load_dotenv_files();

        let mut builder = ConfigBuilder::builder();

        for path in paths {
            if path.exists() {
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("DELIGHT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut delight_config: DelightConfig = config.try_deserialize()?;

        delight_config.apply_env_overrides(|key| std::env::var(key).ok());
        delight_config.validate()?;

        Ok(delight_config)
    }

    /// Apply the flat `DELIGHT_*` variables on top of file values.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DELIGHT_BASE_URL") {
            self.client.base_url = url;
        }

        if let Some(attempts) = lookup("DELIGHT_MAX_ATTEMPTS").and_then(|v| v.parse().ok()) {
            self.client.max_attempts = attempts;
        }

        if let Some(interval) = lookup("DELIGHT_POLL_INTERVAL_MS").and_then(|v| v.parse().ok()) {
            self.client.poll_interval_ms = interval;
        }

        if let Some(timeout) = lookup("DELIGHT_REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok())
        {
            self.client.request_timeout_secs = timeout;
        }

        if let Some(level) = lookup("DELIGHT_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> DelightResult<()> {
        self.client.validate()?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let level_lower = self.logging.level.to_lowercase();
        if !valid_levels.contains(&level_lower.as_str()) && !level_lower.contains('=') {
            return Err(DelightError::InvalidConfigValue {
                key: "logging.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Must be one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        &self.client.base_url
    }

    pub fn log_level(&self) -> &str {
        &self.logging.level
    }
}

pub fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("config").join("default.toml"));
        paths.push(cwd.join("config").join("local.toml"));
        paths.push(cwd.join("delight.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("delight").join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".delight").join("config.toml"));
    }

    paths
}

fn load_dotenv_files() {
    for path in get_dotenv_paths() {
        if path.exists() {
            let _ = dotenvy::from_path(&path);
        }
    }
}

fn get_dotenv_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".env"));
        paths.push(cwd.join(".env.local"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".delight").join(".env"));
    }

    paths
}

pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("delight"))
}

pub fn ensure_config_dir() -> DelightResult<PathBuf> {
    let config_dir = get_config_dir()
        .ok_or_else(|| DelightError::Config("Could not determine config directory".to_string()))?;

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).map_err(|e| {
            DelightError::Config(format!("Failed to create config directory: {}", e))
        })?;
    }

    Ok(config_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default_config();
        assert_eq!(config.base_url, "https://qa.delight.global");
        assert_eq!(config.max_attempts, 30);
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(!config.retry_transient_errors);
        assert!(config.deadline().is_none());
        assert!(config.validate().is_ok());

        assert_eq!(DelightConfig::default().log_level(), "warn");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ClientConfig::with_base_url("");
        assert!(config.validate().is_err());

        config.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.base_url = "http://localhost:8080".to_string();
        assert!(config.validate().is_ok());

        config.max_attempts = 0;
        assert!(matches!(
            config.validate(),
            Err(DelightError::InvalidConfigValue { ref key, .. }) if key == "client.max_attempts"
        ));

        config.max_attempts = 5;
        config.poll_interval_ms = 0;
        assert!(config.validate().is_err());

        config.poll_interval_ms = 10;
        config.deadline_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("DELIGHT_BASE_URL", "http://localhost:9000"),
            ("DELIGHT_MAX_ATTEMPTS", "60"),
            ("DELIGHT_POLL_INTERVAL_MS", "250"),
            ("DELIGHT_REQUEST_TIMEOUT_SECS", "not-a-number"),
            ("RUST_LOG", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = DelightConfig::default();
        config.apply_env_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.base_url(), "http://localhost:9000");
        assert_eq!(config.client.max_attempts, 60);
        assert_eq!(config.client.poll_interval_ms, 250);
        assert_eq!(config.client.request_timeout_secs, 30);
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = DelightConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "delight_core=trace".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delight.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[client]\nbase_url = \"http://127.0.0.1:7000\"\nmax_attempts = 60\n\n[logging]\njson_format = true"
        )
        .unwrap();

        let config = DelightConfig::load_from_paths(vec![path]).unwrap();
        assert_eq!(config.client.max_attempts, 60);
        assert_eq!(config.client.poll_interval_ms, 1000);
        assert!(config.logging.json_format);
    }

    #[test]
    fn test_config_toml_roundtrip_keeps_defaults() {
        let text = "[client]\nbase_url = \"https://example.com\"\n";
        let config: DelightConfig = ConfigBuilder::builder()
            .add_source(File::from_str(text, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.client.base_url, "https://example.com");
        assert_eq!(config.client.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_config_dir() {
        let config_dir = get_config_dir();
        assert!(config_dir.is_some());
        assert!(get_config_paths()
            .iter()
            .any(|p| p.ends_with("delight.toml")));
    }
}
