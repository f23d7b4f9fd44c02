//! Operator-adjustable alert thresholds.
//!
//! [`ThresholdConfig`] is a plain copyable value. [`SharedThresholds`] wraps
//! it for the single-writer/many-reader case: the operator updates limits
//! from the UI thread while the replay task reads one consistent copy per
//! tick.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Valid range for the temperature limit, in °C.
pub const TEMPERATURE_RANGE: RangeInclusive<f64> = 40.0..=100.0;
/// Valid range for the vibration limit.
pub const VIBRATION_RANGE: RangeInclusive<f64> = 1.0..=5.0;

/// Default temperature limit in °C.
pub const DEFAULT_TEMPERATURE_LIMIT: f64 = 60.0;
/// Default vibration limit.
pub const DEFAULT_VIBRATION_LIMIT: f64 = 2.8;

/// Names of the configurable limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdName {
    Temperature,
    Vibration,
}

impl ThresholdName {
    /// Inclusive bounds the limit is clamped to.
    pub fn range(self) -> RangeInclusive<f64> {
        match self {
            ThresholdName::Temperature => TEMPERATURE_RANGE,
            ThresholdName::Vibration => VIBRATION_RANGE,
        }
    }

    /// Steps per unit when the operator nudges the limit (1 °C, 0.1 vibration).
    fn steps_per_unit(self) -> f64 {
        match self {
            ThresholdName::Temperature => 1.0,
            ThresholdName::Vibration => 10.0,
        }
    }

    /// Increment used when the operator nudges the limit.
    pub fn step(self) -> f64 {
        1.0 / self.steps_per_unit()
    }

    pub fn label(self) -> &'static str {
        match self {
            ThresholdName::Temperature => "temperature",
            ThresholdName::Vibration => "vibration",
        }
    }
}

impl fmt::Display for ThresholdName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unknown threshold name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown threshold `{0}` (expected temperature or vibration)")]
pub struct UnknownThreshold(pub String);

impl FromStr for ThresholdName {
    type Err = UnknownThreshold;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "temperature" | "temperature_limit" | "temp" => Ok(ThresholdName::Temperature),
            "vibration" | "vibration_limit" | "vib" => Ok(ThresholdName::Vibration),
            _ => Err(UnknownThreshold(s.to_string())),
        }
    }
}

/// The limits a reading is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub temperature_limit: f64,
    pub vibration_limit: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            temperature_limit: DEFAULT_TEMPERATURE_LIMIT,
            vibration_limit: DEFAULT_VIBRATION_LIMIT,
        }
    }
}

/// Result of a threshold update.
///
/// `requested` is what the operator asked for, `applied` is what the
/// configuration now holds after clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdUpdate {
    pub name: ThresholdName,
    pub requested: f64,
    pub applied: f64,
}

impl ThresholdUpdate {
    /// True when the requested value was out of range and had to be adjusted.
    pub fn was_clamped(&self) -> bool {
        self.requested != self.applied
    }
}

impl ThresholdConfig {
    /// Build a config, clamping both limits into range.
    pub fn new(temperature_limit: f64, vibration_limit: f64) -> Self {
        let mut config = Self::default();
        config.set(ThresholdName::Temperature, temperature_limit);
        config.set(ThresholdName::Vibration, vibration_limit);
        config
    }

    pub fn get(&self, name: ThresholdName) -> f64 {
        match name {
            ThresholdName::Temperature => self.temperature_limit,
            ThresholdName::Vibration => self.vibration_limit,
        }
    }

    /// Set a limit, clamping out-of-range values to the nearest bound.
    ///
    /// NaN leaves the current value unchanged.
    pub fn set(&mut self, name: ThresholdName, value: f64) -> ThresholdUpdate {
        let applied = if value.is_nan() {
            self.get(name)
        } else {
            let range = name.range();
            value.clamp(*range.start(), *range.end())
        };

        match name {
            ThresholdName::Temperature => self.temperature_limit = applied,
            ThresholdName::Vibration => self.vibration_limit = applied,
        }

        ThresholdUpdate {
            name,
            requested: value,
            applied,
        }
    }

    /// Move a limit by `steps` increments, rounded to the step size.
    pub fn adjust(&mut self, name: ThresholdName, steps: i32) -> ThresholdUpdate {
        let scale = name.steps_per_unit();
        let target = (self.get(name) * scale).round() + f64::from(steps);
        self.set(name, target / scale)
    }

    /// How far `value` sits above (positive) or below the named limit.
    pub fn delta(&self, name: ThresholdName, value: f64) -> f64 {
        value - self.get(name)
    }
}

/// Thread-safe handle to a live [`ThresholdConfig`].
///
/// Cloning the handle shares the same configuration.
#[derive(Debug, Clone, Default)]
pub struct SharedThresholds {
    inner: Arc<RwLock<ThresholdConfig>>,
}

impl SharedThresholds {
    pub fn new(config: ThresholdConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Copy the current configuration under a single read lock.
    pub fn snapshot(&self) -> ThresholdConfig {
        *self.inner.read()
    }

    pub fn set(&self, name: ThresholdName, value: f64) -> ThresholdUpdate {
        let update = self.inner.write().set(name, value);
        log_update(&update);
        update
    }

    pub fn adjust(&self, name: ThresholdName, steps: i32) -> ThresholdUpdate {
        let update = self.inner.write().adjust(name, steps);
        log_update(&update);
        update
    }
}

fn log_update(update: &ThresholdUpdate) {
    if update.was_clamped() {
        tracing::warn!(
            threshold = %update.name,
            requested = update.requested,
            applied = update.applied,
            "threshold out of range, clamped"
        );
    } else {
        tracing::info!(threshold = %update.name, value = update.applied, "threshold updated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ThresholdConfig::default();
        assert_eq!(config.temperature_limit, 60.0);
        assert_eq!(config.vibration_limit, 2.8);
    }

    #[test]
    fn test_set_in_range() {
        let mut config = ThresholdConfig::default();
        let update = config.set(ThresholdName::Temperature, 75.0);
        assert!(!update.was_clamped());
        assert_eq!(config.temperature_limit, 75.0);
    }

    #[test]
    fn test_set_clamps_to_bounds() {
        let mut config = ThresholdConfig::default();

        let update = config.set(ThresholdName::Temperature, 150.0);
        assert!(update.was_clamped());
        assert_eq!(update.requested, 150.0);
        assert_eq!(update.applied, 100.0);

        let update = config.set(ThresholdName::Vibration, 0.2);
        assert_eq!(update.applied, 1.0);
        assert_eq!(config.vibration_limit, 1.0);

        config.set(ThresholdName::Vibration, f64::INFINITY);
        assert_eq!(config.vibration_limit, 5.0);
    }

    #[test]
    fn test_set_nan_keeps_current() {
        let mut config = ThresholdConfig::default();
        let update = config.set(ThresholdName::Vibration, f64::NAN);
        assert!(update.was_clamped());
        assert_eq!(config.vibration_limit, 2.8);
    }

    #[test]
    fn test_adjust_rounds_to_step() {
        let mut config = ThresholdConfig::default();
        for _ in 0..3 {
            config.adjust(ThresholdName::Vibration, 1);
        }
        assert_eq!(config.vibration_limit, 3.1);

        config.adjust(ThresholdName::Temperature, -5);
        assert_eq!(config.temperature_limit, 55.0);

        let update = config.adjust(ThresholdName::Temperature, -100);
        assert_eq!(update.applied, 40.0);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("temp".parse::<ThresholdName>().unwrap(), ThresholdName::Temperature);
        assert_eq!(
            "Vibration_Limit".parse::<ThresholdName>().unwrap(),
            ThresholdName::Vibration
        );
        assert!("pressure".parse::<ThresholdName>().is_err());
    }

    #[test]
    fn test_delta() {
        let config = ThresholdConfig::default();
        assert_eq!(config.delta(ThresholdName::Temperature, 70.0), 10.0);
        assert!(config.delta(ThresholdName::Vibration, 2.0) < 0.0);
    }

    #[test]
    fn test_shared_update_visible_to_clones() {
        let shared = SharedThresholds::default();
        let reader = shared.clone();
        shared.set(ThresholdName::Temperature, 45.0);
        assert_eq!(reader.snapshot().temperature_limit, 45.0);
    }
}
