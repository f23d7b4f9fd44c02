//! Whole-recording evaluation report for `--export`.
//!
//! Runs the replay controller with no pacing and summarises every tick.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

use crate::data::{FaultReason, SharedThresholds, ThresholdConfig};
use crate::replay::{ReplayController, ReplayState, TickOutcome};
use crate::sink::MemorySink;
use crate::source::ReadingSource;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub evaluated: usize,
    pub normal: usize,
    pub faults: usize,
    pub temperature_faults: usize,
    pub vibration_faults: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaultEntry {
    pub index: usize,
    pub timestamp: String,
    pub temperature: f64,
    pub vibration_x: f64,
    pub vibration_z: f64,
    pub reasons: Vec<FaultReason>,
    pub messages: Vec<&'static str>,
}

/// Result of evaluating an entire source against fixed thresholds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub source: String,
    pub thresholds: ThresholdConfig,
    pub state: ReplayState,
    pub summary: ReportSummary,
    pub faults: Vec<FaultEntry>,
    /// Why evaluation stopped early, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halted: Option<String>,
}

impl EvaluationReport {
    pub fn build(source: Arc<dyn ReadingSource>, thresholds: ThresholdConfig) -> Self {
        let sink = MemorySink::new();
        let description = source.description().to_string();
        let total = source.len();
        let mut controller = ReplayController::new(
            source,
            SharedThresholds::new(thresholds),
            Box::new(sink.clone()),
            1,
        );

        controller.start(Duration::ZERO);
        let mut halted = None;
        loop {
            match controller.step() {
                Ok(TickOutcome::Emitted { .. }) => continue,
                Ok(TickOutcome::Halted(_)) => break,
                Err(err) => {
                    halted = Some(err.to_string());
                    break;
                }
            }
        }

        let snapshots = sink.snapshots();
        let mut summary = ReportSummary {
            total,
            evaluated: snapshots.len(),
            normal: 0,
            faults: 0,
            temperature_faults: 0,
            vibration_faults: 0,
        };
        let mut faults = Vec::new();

        for snapshot in &snapshots {
            let classification = &snapshot.classification;
            if !classification.is_fault {
                summary.normal += 1;
                continue;
            }
            summary.faults += 1;
            for reason in &classification.reasons {
                match reason {
                    FaultReason::TemperatureOverheat => summary.temperature_faults += 1,
                    FaultReason::VibrationAnomaly => summary.vibration_faults += 1,
                }
            }
            let reading = &snapshot.reading;
            faults.push(FaultEntry {
                index: snapshot.index,
                timestamp: reading.timestamp.clone(),
                temperature: reading.temperature,
                vibration_x: reading.vibration_x,
                vibration_z: reading.vibration_z,
                reasons: classification.reasons.clone(),
                messages: classification.messages(),
            });
        }

        Self {
            source: description,
            thresholds,
            state: controller.state(),
            summary,
            faults,
            halted,
        }
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FileSource, Reading, VecSource};
    use tempfile::NamedTempFile;

    #[test]
    fn test_report_counts_faults() {
        let source = VecSource::new(vec![
            Reading::new("10", 30.0, 1.0, 1.0),
            Reading::new("20", 70.0, 1.0, 1.0),
            Reading::new("30", 50.0, 3.0, 1.0),
            Reading::new("40", 65.0, 1.0, 3.2),
        ]);
        let report = EvaluationReport::build(Arc::new(source), ThresholdConfig::new(60.0, 2.8));

        assert_eq!(report.state, ReplayState::Completed);
        assert_eq!(report.summary.total, 4);
        assert_eq!(report.summary.evaluated, 4);
        assert_eq!(report.summary.normal, 1);
        assert_eq!(report.summary.faults, 3);
        assert_eq!(report.summary.temperature_faults, 2);
        assert_eq!(report.summary.vibration_faults, 2);
        assert_eq!(report.faults[0].timestamp, "20");
        assert_eq!(report.faults[2].reasons.len(), 2);
        assert!(report.halted.is_none());
    }

    #[test]
    fn test_report_records_halt() {
        let csv = "timestamp,temperature,vibration_x,vibration_z\n10,30,1,1\n20,,1,1\n";
        let source = FileSource::from_csv_reader(csv.as_bytes(), "test").unwrap();
        let report = EvaluationReport::build(Arc::new(source), ThresholdConfig::default());

        assert_eq!(report.state, ReplayState::Failed);
        assert_eq!(report.summary.evaluated, 1);
        assert!(report.halted.unwrap().contains("index 1"));
    }

    #[test]
    fn test_write_json() {
        let source = VecSource::new(vec![Reading::new("10", 75.0, 1.0, 1.0)]);
        let report = EvaluationReport::build(Arc::new(source), ThresholdConfig::default());
        let file = NamedTempFile::new().unwrap();
        report.write_json(file.path()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["summary"]["faults"], 1);
        assert_eq!(value["faults"][0]["reasons"][0], "temperature-overheat");
        assert_eq!(value["state"], "completed");
    }
}
