use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable pointing at a config file.
pub const CONFIG_ENV: &str = "RUSTY_SPECTRO_CONFIG";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "rusty-spectro.json";

// ---------------------------------------------------------------------------
// Application configuration
// ---------------------------------------------------------------------------

/// Startup settings. Every field has a default, so a config file only needs
/// the keys it wants to change:
///
/// ```json
/// { "integration_time_ms": 20.0, "averaging": 4, "force_dummy": true }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Period of the acquisition tick.
    pub tick_interval_ms: u64,
    /// Initial integration time shown in the control.
    pub integration_time_ms: f64,
    /// Initial averaging count.
    pub averaging: u32,
    /// Skip hardware enumeration and always use the synthetic device.
    pub force_dummy: bool,
    /// Path to the SeaBreeze shared library (platform default otherwise).
    pub seabreeze_library: Option<PathBuf>,
    /// Wavelength axis for the synthetic device.
    pub dummy_wavelengths: Option<PathBuf>,
    /// Fixed RNG seed for the synthetic device.
    pub dummy_seed: Option<u64>,
    /// Initial window size in points.
    pub window_size: [f32; 2],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            integration_time_ms: 100.0,
            averaging: 1,
            force_dummy: false,
            seabreeze_library: None,
            dummy_wavelengths: None,
            dummy_seed: None,
            window_size: [1200.0, 800.0],
        }
    }
}

impl AppConfig {
    /// Parse a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Resolve the config from `$RUSTY_SPECTRO_CONFIG`, then
    /// `./rusty-spectro.json`, then defaults. Problems are logged, never fatal.
    pub fn load() -> Self {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(p) => PathBuf::from(p),
            None => {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !local.exists() {
                    log::debug!("No config file, using defaults");
                    return Self::default();
                }
                local
            }
        };
        match Self::from_file(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::error!("{e:#}; using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let path = std::env::temp_dir().join("rusty_spectro_partial_config.json");
        std::fs::write(&path, r#"{ "averaging": 8, "force_dummy": true }"#).unwrap();
        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.averaging, 8);
        assert!(config.force_dummy);
        assert_eq!(config.tick_interval_ms, 50);
        assert_eq!(config.integration_time_ms, 100.0);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = std::env::temp_dir().join("rusty_spectro_bad_config.json");
        std::fs::write(&path, "{ averaging: ").unwrap();
        assert!(AppConfig::from_file(&path).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
