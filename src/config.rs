//! Layered settings: built-in defaults, an optional config file, then
//! `MOTORWATCH_*` environment variables. Command-line flags are applied on
//! top by the binary.
//!
//! ```toml
//! data = "motor_data.csv"
//! interval = "500ms"
//! window = 60
//! temperature_limit = 65
//! vibration_limit = 3.0
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::duration::parse_duration;
use crate::data::{ThresholdConfig, DEFAULT_WINDOW_CAPACITY};

/// Runtime settings for a replay.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Recording to replay (CSV or JSON).
    pub data: PathBuf,
    /// Pause between ticks, as a duration string.
    pub interval: String,
    /// Rolling window capacity.
    pub window: usize,
    pub temperature_limit: f64,
    pub vibration_limit: f64,
}

impl Default for Settings {
    fn default() -> Self {
        let thresholds = ThresholdConfig::default();
        Self {
            data: PathBuf::from("motor_data.csv"),
            interval: "1s".to_string(),
            window: DEFAULT_WINDOW_CAPACITY,
            temperature_limit: thresholds.temperature_limit,
            vibration_limit: thresholds.vibration_limit,
        }
    }
}

impl Settings {
    /// Merge defaults, the optional file at `path`, and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(Environment::with_prefix("MOTORWATCH").try_parsing(true))
            .build()
            .context("Failed to load configuration")?;

        Ok(config.try_deserialize()?)
    }

    /// The tick interval, parsed.
    pub fn interval(&self) -> Result<Duration> {
        parse_duration(&self.interval)
            .with_context(|| format!("Invalid interval {:?}", self.interval))
    }

    /// Starting thresholds, clamped into their valid ranges.
    pub fn thresholds(&self) -> ThresholdConfig {
        ThresholdConfig::new(self.temperature_limit, self.vibration_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.interval().unwrap(), Duration::from_secs(1));
        assert_eq!(settings.window, 60);
        assert_eq!(settings.thresholds(), ThresholdConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
data = "recordings/run1.json"
interval = "250ms"
window = 30
temperature_limit = 72
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.data, PathBuf::from("recordings/run1.json"));
        assert_eq!(settings.interval().unwrap(), Duration::from_millis(250));
        assert_eq!(settings.window, 30);
        assert_eq!(settings.temperature_limit, 72.0);
        // Unset keys keep their defaults
        assert_eq!(settings.vibration_limit, 2.8);
    }

    #[test]
    fn test_out_of_range_limits_are_clamped() {
        let settings = Settings {
            temperature_limit: 10.0,
            vibration_limit: 9.0,
            ..Settings::default()
        };
        let thresholds = settings.thresholds();
        assert_eq!(thresholds.temperature_limit, 40.0);
        assert_eq!(thresholds.vibration_limit, 5.0);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/motorwatch.toml"))).is_err());
    }

    #[test]
    fn test_bad_interval() {
        let settings = Settings {
            interval: "fast".to_string(),
            ..Settings::default()
        };
        assert!(settings.interval().is_err());
    }
}
