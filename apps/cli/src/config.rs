//! CLI configuration loading and merging.

use std::path::PathBuf;

use anyhow::{Context, Result};
use licensight_core::LicensightConfig;

/// Load and merge CLI configuration.
///
/// Configuration precedence:
/// 1. CLI arguments (`--data-dir`, `--json`, `--log-level`)
/// 2. Environment variables (`LICENSIGHT_DATA_DIR`)
/// 3. Local config file (./.licensightrc)
/// 4. Global config file (~/.licensight/config.toml)
/// 5. Defaults
pub fn load_config(json: bool) -> Result<LicensightConfig> {
    let mut config =
        LicensightConfig::discover_and_load().context("Failed to load configuration")?;

    if json {
        config.output.format = "json".to_string();
    }
    Ok(config)
}

/// Data directory from the flag, then `LICENSIGHT_DATA_DIR`, then the config file.
pub fn data_dir(flag: Option<PathBuf>, config: &LicensightConfig) -> PathBuf {
    flag.unwrap_or_else(|| config.data_dir())
}

/// Log level from the flag, then the config file, then `warn`.
pub fn log_level(flag: Option<&str>, config: &LicensightConfig) -> tracing::Level {
    match flag.or(config.log_level.as_deref()).unwrap_or("warn") {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::WARN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_precedence() {
        let mut config = LicensightConfig::default();
        assert_eq!(log_level(None, &config), tracing::Level::WARN);

        config.log_level = Some("debug".to_string());
        assert_eq!(log_level(None, &config), tracing::Level::DEBUG);
        assert_eq!(log_level(Some("error"), &config), tracing::Level::ERROR);
        assert_eq!(log_level(Some("bogus"), &config), tracing::Level::WARN);
    }

    #[test]
    fn test_data_dir_flag_wins() {
        let config =
            LicensightConfig { data_dir: Some("from-file".to_string()), ..Default::default() };
        assert_eq!(data_dir(Some(PathBuf::from("flag")), &config), PathBuf::from("flag"));
    }
}
