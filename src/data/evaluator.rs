//! Fixed-threshold fault classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::thresholds::ThresholdConfig;
use crate::source::Reading;

/// Message shown when no limit is exceeded.
pub const NORMAL_MESSAGE: &str = "System status: operating normally";

/// Why a reading was flagged.
///
/// Variants are declared in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FaultReason {
    TemperatureOverheat,
    VibrationAnomaly,
}

impl FaultReason {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            FaultReason::TemperatureOverheat => "temperature-overheat",
            FaultReason::VibrationAnomaly => "vibration-anomaly",
        }
    }

    /// Operator-facing diagnosis.
    pub fn message(&self) -> &'static str {
        match self {
            FaultReason::TemperatureOverheat => {
                "Motor temperature too high, check the cooling system"
            }
            FaultReason::VibrationAnomaly => {
                "Vibration amplitude abnormal, possible structural looseness or imbalance"
            }
        }
    }
}

impl fmt::Display for FaultReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of evaluating one reading.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Classification {
    pub is_fault: bool,
    /// Temperature reason first, then vibration.
    pub reasons: Vec<FaultReason>,
}

impl Classification {
    pub fn normal() -> Self {
        Self::default()
    }

    /// Reason codes in order.
    pub fn codes(&self) -> Vec<&'static str> {
        self.reasons.iter().map(FaultReason::code).collect()
    }

    /// Operator messages in order, or the normal-status message.
    pub fn messages(&self) -> Vec<&'static str> {
        if self.is_fault {
            self.reasons.iter().map(FaultReason::message).collect()
        } else {
            vec![NORMAL_MESSAGE]
        }
    }
}

/// Classify a reading against the given limits.
///
/// Comparisons are strict: a value equal to its limit is normal. Either
/// vibration axis over the limit yields a single vibration reason.
pub fn evaluate(reading: &Reading, config: &ThresholdConfig) -> Classification {
    let overheat = reading.temperature > config.temperature_limit;
    let vibration = reading.vibration_x > config.vibration_limit
        || reading.vibration_z > config.vibration_limit;

    let mut reasons = Vec::with_capacity(2);
    if overheat {
        reasons.push(FaultReason::TemperatureOverheat);
    }
    if vibration {
        reasons.push(FaultReason::VibrationAnomaly);
    }

    Classification {
        is_fault: !reasons.is_empty(),
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ThresholdConfig {
        ThresholdConfig::new(60.0, 2.8)
    }

    #[test]
    fn test_reference_sequence() {
        let readings = [
            Reading::new("10", 30.0, 1.0, 1.0),
            Reading::new("20", 70.0, 1.0, 1.0),
            Reading::new("30", 50.0, 3.0, 1.0),
        ];
        let results: Vec<Classification> =
            readings.iter().map(|r| evaluate(r, &config())).collect();

        assert_eq!(results[0], Classification::normal());
        assert!(results[1].is_fault);
        assert_eq!(results[1].codes(), vec!["temperature-overheat"]);
        assert!(results[2].is_fault);
        assert_eq!(results[2].codes(), vec!["vibration-anomaly"]);
    }

    #[test]
    fn test_limit_is_strict() {
        let at_limit = Reading::new("t", 60.0, 2.8, 2.8);
        assert!(!evaluate(&at_limit, &config()).is_fault);

        let just_over = Reading::new("t", 60.000001, 2.8, 2.8);
        assert!(evaluate(&just_over, &config()).is_fault);
    }

    #[test]
    fn test_reason_order_when_both_exceed() {
        let reading = Reading::new("t", 90.0, 1.0, 4.0);
        let result = evaluate(&reading, &config());
        assert_eq!(
            result.reasons,
            vec![FaultReason::TemperatureOverheat, FaultReason::VibrationAnomaly]
        );
    }

    #[test]
    fn test_single_vibration_reason_for_both_axes() {
        let reading = Reading::new("t", 30.0, 3.5, 4.0);
        assert_eq!(evaluate(&reading, &config()).reasons, vec![FaultReason::VibrationAnomaly]);
    }

    #[test]
    fn test_fault_matches_predicate_across_grid() {
        let cfg = ThresholdConfig::new(55.0, 2.0);
        for temp in [40.0, 55.0, 55.5, 80.0] {
            for vx in [0.5, 2.0, 2.1] {
                for vz in [0.5, 2.0, 3.0] {
                    let r = Reading::new("t", temp, vx, vz);
                    let expected = temp > 55.0 || vx > 2.0 || vz > 2.0;
                    assert_eq!(evaluate(&r, &cfg).is_fault, expected, "{:?}", r);
                }
            }
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(Classification::normal().messages(), vec![NORMAL_MESSAGE]);
        let result = evaluate(&Reading::new("t", 61.0, 1.0, 1.0), &config());
        assert!(result.messages()[0].contains("cooling"));
    }

    #[test]
    fn test_reason_serializes_as_code() {
        let json = serde_json::to_string(&FaultReason::VibrationAnomaly).unwrap();
        assert_eq!(json, "\"vibration-anomaly\"");
    }
}
