use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PelotonTcxError;
use crate::logging::LogConfig;
use crate::units::UnitPolicy;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Conversion settings
    #[serde(default)]
    pub transcode: TranscodeSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LogConfig,
}

/// Settings consumed by the transcoder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscodeSettings {
    /// Seconds between samples; falls back to each record's own granularity
    #[serde(default)]
    pub data_granularity_seconds: Option<u32>,

    /// Directory receiving `<workout id>.tcx` files
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Source units per speed field
    #[serde(default)]
    pub units: UnitPolicy,
}

impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".peloton-tcx")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::debug!(path = %config_path.display(), error = %err, "Using default configuration");
                Self::default()
            }
        }
    }

    /// Reject settings the transcoder cannot honor
    pub fn validate(&self) -> std::result::Result<(), PelotonTcxError> {
        if self.transcode.data_granularity_seconds == Some(0) {
            return Err(PelotonTcxError::Configuration(
                "data_granularity_seconds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::SpeedUnit;
    use tempfile::tempdir;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [transcode]
            data_granularity_seconds = 5

            [transcode.units]
            max_speed = "miles_per_hour"
            sample_speed = "miles_per_hour"
            avg_speed = "miles_per_hour"
            "#,
        )
        .unwrap();

        assert_eq!(config.transcode.data_granularity_seconds, Some(5));
        assert_eq!(config.transcode.units.avg_speed, SpeedUnit::MilesPerHour);
        assert!(config.transcode.output_dir.is_none());
        assert_eq!(config.logging, LogConfig::default());
    }

    #[test]
    fn test_zero_granularity_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[transcode]\ndata_granularity_seconds = 0\n").unwrap();

        assert!(AppConfig::load_from_file(&path).is_err());
    }

    #[test]
    fn test_config_file_io() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut original = AppConfig::default();
        original.transcode.output_dir = Some(PathBuf::from("/tmp/tcx"));
        original.save_to_file(&config_path).unwrap();

        let loaded = AppConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded, original);
    }
}
