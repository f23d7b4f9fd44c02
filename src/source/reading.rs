//! The sensor reading record.

use serde::{Deserialize, Serialize};

/// A single timestamped motor sensor sample.
///
/// Readings are immutable once loaded. Sources hand them out as
/// `Arc<Reading>` so the rolling window and snapshots share rather than copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Timestamp label as recorded in the source data.
    pub timestamp: String,
    /// Motor temperature in °C.
    pub temperature: f64,
    /// Vibration amplitude along the X axis.
    pub vibration_x: f64,
    /// Vibration amplitude along the Z axis.
    pub vibration_z: f64,
}

impl Reading {
    pub fn new(
        timestamp: impl Into<String>,
        temperature: f64,
        vibration_x: f64,
        vibration_z: f64,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            temperature,
            vibration_x,
            vibration_z,
        }
    }

    /// Check that every numeric field is finite.
    ///
    /// Returns a description of the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("temperature", self.temperature),
            ("vibration_x", self.vibration_x),
            ("vibration_z", self.vibration_z),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(format!("field `{}` is not finite: {}", name, value));
            }
        }
        Ok(())
    }
}
