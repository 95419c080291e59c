//! User configuration (`config.toml`)
//!
//! Looked up in order: explicit path, `ZEITAN_CONFIG`, then
//! `<config home>/zeitan/config.toml`. A missing file means defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::tax::CalculationMethod;

pub const CONFIG_ENV: &str = "ZEITAN_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Method used when `--method` is not given
    pub default_method: CalculationMethod,
    /// Prefix for monetary values in table output
    pub currency_symbol: String,
    /// Rounding of monetary values in table output (exports keep full precision)
    pub decimal_places: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_method: CalculationMethod::MovingAverage,
            currency_symbol: "¥".to_string(),
            decimal_places: 0,
        }
    }
}

impl Config {
    /// Default config file location, if a config directory can be determined
    pub fn default_path() -> Option<PathBuf> {
        dir_spec::config_home().map(|dir| dir.join("zeitan").join("config.toml"))
    }

    /// Resolve the config path and load it
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .or_else(Self::default_path);

        match path {
            Some(path) if path.exists() => Self::from_file(&path),
            Some(path) if explicit.is_some() => {
                anyhow::bail!("Config file not found: {:?}", path)
            }
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("Invalid config file {:?}", path))?;
        debug!("Loaded config from {:?}: {:?}", path, config);
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.default_method, CalculationMethod::MovingAverage);
        assert_eq!(config.currency_symbol, "¥");
        assert_eq!(config.decimal_places, 0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml("default_method = \"total_average\"\n").unwrap();
        assert_eq!(config.default_method, CalculationMethod::TotalAverage);
        assert_eq!(config.currency_symbol, "¥");
    }

    #[test]
    fn test_invalid_method_is_rejected() {
        assert!(Config::from_toml("default_method = \"fifo\"\n").is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "currency_symbol = \"JPY \"\ndecimal_places = 2").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.currency_symbol, "JPY ");
        assert_eq!(config.decimal_places, 2);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
