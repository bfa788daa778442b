//! Tool configuration.
//!
//! Loads `config.toml` from the user config directory (or a path given with
//! `--config`). All values are optional — a missing file is simply the stock
//! configuration, and config files are sparse:
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! # history_file = "/path/to/history.json"   # default: user data dir
//!
//! [preview]
//! max_edge = 96             # Preview thumbnail bound in pixels (0 disables)
//!
//! [geocode]
//! enabled = true            # Reverse-geocode GPS pairs after extraction
//! endpoint = "https://nominatim.openstreetmap.org/reverse"
//! timeout_secs = 5          # Hard cap on one lookup
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `config.toml`.
///
/// User config files need only specify the values they want to override.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Override for the history slot location.
    pub history_file: Option<PathBuf>,
    /// Preview thumbnail settings.
    pub preview: PreviewConfig,
    /// Reverse geocoding settings.
    pub geocode: GeocodeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_file: None,
            preview: PreviewConfig::default(),
            geocode: GeocodeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewConfig {
    /// Bound on the preview's longer edge, in pixels. `0` disables previews.
    pub max_edge: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_edge: crate::preview::DEFAULT_PREVIEW_EDGE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeocodeConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: crate::geocode::NominatimGeocoder::DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 5,
        }
    }
}

impl Config {
    /// Load from an explicit file. The file must exist and parse.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the default location, treating an absent file as the stock
    /// configuration.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// `<user config dir>/photoproof/config.toml`, when the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("photoproof").join("config.toml"))
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.preview.max_edge > 1024 {
            return Err(ConfigError::Validation(
                "preview.max_edge must be 1024 or less".into(),
            ));
        }
        if self.geocode.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "geocode.timeout_secs must be at least 1".into(),
            ));
        }
        if self.geocode.enabled && self.geocode.endpoint.trim().is_empty() {
            return Err(ConfigError::Validation(
                "geocode.endpoint must not be empty when geocoding is enabled".into(),
            ));
        }
        Ok(())
    }
}

/// A fully documented stock `config.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> String {
    format!(
        r#"# photoproof configuration
# All options are optional - defaults shown below.

# Where the check history is stored. Default: the user data directory.
# history_file = "/home/me/.local/share/photoproof/history.json"

[preview]
# Bound on the embedded preview thumbnail's longer edge, in pixels.
# Set to 0 to record history entries without previews.
max_edge = {max_edge}

[geocode]
# Reverse-geocode the GPS pair to a place name after extraction.
# Lookups degrade silently: a failed or slow lookup never fails a check.
enabled = true
endpoint = "{endpoint}"
timeout_secs = 5
"#,
        max_edge = crate::preview::DEFAULT_PREVIEW_EDGE,
        endpoint = crate::geocode::NominatimGeocoder::DEFAULT_ENDPOINT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn stock_config_parses_back_to_defaults() {
        let config: Config = toml::from_str(&stock_config_toml()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.preview.max_edge, crate::preview::DEFAULT_PREVIEW_EDGE);
        assert!(config.geocode.enabled);
        assert_eq!(config.geocode.timeout_secs, 5);
    }

    #[test]
    fn sparse_config_overrides_only_named_values() {
        let config: Config = toml::from_str("[geocode]\nenabled = false\n").unwrap();
        assert!(!config.geocode.enabled);
        assert_eq!(config.preview.max_edge, crate::preview::DEFAULT_PREVIEW_EDGE);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Config>("histroy_file = \"x\"\n").is_err());
        assert!(toml::from_str::<Config>("[preview]\nmax_egde = 4\n").is_err());
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let config: Config = toml::from_str("[geocode]\ntimeout_secs = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_preview_fails_validation() {
        let config: Config = toml::from_str("[preview]\nmax_edge = 4096\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reads_a_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[preview]\nmax_edge = 48\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.preview.max_edge, 48);
    }

    #[test]
    fn load_missing_file_errors() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(&dir.path().join("absent.toml")).is_err());
    }
}
