//! Configuration file support.
//!
//! Settings come from TOML files, overridden by environment variables and
//! finally by command-line flags.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::IsolationForestConfig;

/// Environment variable overriding [`LicensightConfig::data_dir`].
pub const DATA_DIR_ENV: &str = "LICENSIGHT_DATA_DIR";

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_HORIZON_DAYS: usize = 90;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LicensightConfig {
    /// Directory holding licenses.json and usage_metrics.json
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Default forecast horizon in days
    #[serde(default)]
    pub horizon_days: Option<usize>,

    /// Anomaly detector settings
    #[serde(default)]
    pub anomaly: Option<IsolationForestConfig>,

    /// Natural-language assistant settings
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Output format preferences
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: Option<String>,
}

/// Assistant provider configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// `rule-based` or `openai`
    #[serde(default)]
    pub provider: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[serde(default)]
    pub base_url: Option<String>,

    /// Name of the environment variable holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,
}

impl AssistantConfig {
    pub fn provider(&self) -> &str {
        self.provider.as_deref().unwrap_or("rule-based")
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or("gpt-4-turbo-preview")
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or("https://api.openai.com/v1")
    }

    pub fn api_key_env(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or("OPENAI_API_KEY")
    }

    /// API key read from the configured environment variable, if set and non-empty.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(self.api_key_env()).ok().filter(|key| !key.is_empty())
    }
}

/// Output format configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format (human, json)
    #[serde(default = "default_output_format")]
    pub format: String,
}

fn default_output_format() -> String {
    "human".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { format: default_output_format() }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    ReadError(String),

    /// Failed to parse configuration file.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl LicensightConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
    }

    /// Get default global configuration file path.
    pub fn default_global_path() -> PathBuf {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".licensight")
            .join("config.toml")
    }

    /// Get default local configuration file path.
    pub fn default_local_path() -> PathBuf {
        PathBuf::from(".licensightrc")
    }

    /// Discover and load configuration files.
    ///
    /// Loads configuration from:
    /// 1. Global config (~/.licensight/config.toml)
    /// 2. Local config (./.licensightrc)
    ///
    /// Local config overrides global config.
    pub fn discover_and_load() -> ConfigResult<Self> {
        Self::load_layers(&Self::default_global_path(), &Self::default_local_path())
    }

    /// Loads `global` then `local`, skipping files that do not exist.
    pub fn load_layers(global: &Path, local: &Path) -> ConfigResult<Self> {
        let mut config = Self::default();

        for path in [global, local] {
            match Self::load_from_file(path) {
                Ok(layer) => config.merge(&layer),
                Err(ConfigError::NotFound(_)) => {}
                Err(err) => return Err(err),
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Merge another configuration into this one.
    ///
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &Self) {
        if let Some(ref data_dir) = other.data_dir {
            self.data_dir = Some(data_dir.clone());
        }
        if let Some(horizon_days) = other.horizon_days {
            self.horizon_days = Some(horizon_days);
        }
        if let Some(anomaly) = other.anomaly {
            self.anomaly = Some(anomaly);
        }
        if let Some(ref log_level) = other.log_level {
            self.log_level = Some(log_level.clone());
        }

        let assistant = &other.assistant;
        for (target, value) in [
            (&mut self.assistant.provider, &assistant.provider),
            (&mut self.assistant.model, &assistant.model),
            (&mut self.assistant.base_url, &assistant.base_url),
            (&mut self.assistant.api_key_env, &assistant.api_key_env),
        ] {
            if value.is_some() {
                target.clone_from(value);
            }
        }

        if other.output.format != "human" {
            self.output.format = other.output.format.clone();
        }
    }

    /// Rejects values the engine cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.horizon_days == Some(0) {
            return Err(ConfigError::InvalidValue("horizon_days must be positive".to_string()));
        }
        if let Some(anomaly) = self.anomaly {
            if anomaly.trees == 0 {
                return Err(ConfigError::InvalidValue("anomaly.trees must be positive".to_string()));
            }
            if anomaly.contamination <= 0.0 || anomaly.contamination > 0.5 {
                return Err(ConfigError::InvalidValue(format!(
                    "anomaly.contamination must be in (0, 0.5], got {}",
                    anomaly.contamination
                )));
            }
        }
        if !matches!(self.output.format.as_str(), "human" | "json") {
            return Err(ConfigError::InvalidValue(format!(
                "output.format must be human or json, got {}",
                self.output.format
            )));
        }
        if !matches!(self.assistant.provider(), "rule-based" | "openai") {
            return Err(ConfigError::InvalidValue(format!(
                "assistant.provider must be rule-based or openai, got {}",
                self.assistant.provider()
            )));
        }
        Ok(())
    }

    /// Data directory: `LICENSIGHT_DATA_DIR`, then the file setting, then `data`.
    pub fn data_dir(&self) -> PathBuf {
        std::env::var(DATA_DIR_ENV)
            .ok()
            .filter(|dir| !dir.is_empty())
            .or_else(|| self.data_dir.clone())
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from)
    }

    pub fn horizon_days(&self) -> usize {
        self.horizon_days.unwrap_or(DEFAULT_HORIZON_DAYS)
    }

    pub fn anomaly(&self) -> IsolationForestConfig {
        self.anomaly.unwrap_or_default()
    }

    pub fn wants_json(&self) -> bool {
        self.output.format == "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let config_content = r#"
data_dir = "/srv/licensight"
horizon_days = 30
log_level = "debug"

[anomaly]
seed = 7

[assistant]
provider = "openai"
model = "gpt-4o-mini"

[output]
format = "json"
"#;

        std::fs::write(&config_path, config_content).unwrap();

        let config = LicensightConfig::load_from_file(&config_path).unwrap();
        assert_eq!(config.data_dir, Some("/srv/licensight".to_string()));
        assert_eq!(config.horizon_days(), 30);
        assert_eq!(config.log_level, Some("debug".to_string()));
        assert_eq!(config.anomaly().seed, 7);
        assert_eq!(config.anomaly().trees, 100);
        assert_eq!(config.assistant.provider(), "openai");
        assert_eq!(config.assistant.model(), "gpt-4o-mini");
        assert_eq!(config.assistant.api_key_env(), "OPENAI_API_KEY");
        assert!(config.wants_json());
    }

    #[test]
    fn test_defaults() {
        let config = LicensightConfig::default();
        assert_eq!(config.horizon_days(), 90);
        assert_eq!(config.anomaly(), IsolationForestConfig::default());
        assert_eq!(config.assistant.provider(), "rule-based");
        assert!(!config.wants_json());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge() {
        let mut global = LicensightConfig {
            data_dir: Some("global".to_string()),
            horizon_days: Some(60),
            ..Default::default()
        };

        let local = LicensightConfig {
            data_dir: Some("local".to_string()),
            assistant: AssistantConfig {
                provider: Some("openai".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        global.merge(&local);
        assert_eq!(global.data_dir, Some("local".to_string()));
        assert_eq!(global.horizon_days, Some(60));
        assert_eq!(global.assistant.provider(), "openai");
    }

    #[test]
    fn test_load_layers_skips_missing_files() {
        let temp_dir = TempDir::new().unwrap();
        let local = temp_dir.path().join(".licensightrc");
        std::fs::write(&local, "horizon_days = 14\n").unwrap();

        let config =
            LicensightConfig::load_layers(&temp_dir.path().join("missing.toml"), &local).unwrap();
        assert_eq!(config.horizon_days(), 14);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let local = temp_dir.path().join(".licensightrc");
        std::fs::write(&local, "[anomaly]\ncontamination = 0.9\n").unwrap();

        let err = LicensightConfig::load_layers(&temp_dir.path().join("none"), &local).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn test_parse_error_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "horizon_days = \"soon\"").unwrap();

        let err = LicensightConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
