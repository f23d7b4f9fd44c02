//! Example: Stepping a replay by hand
//!
//! Builds an in-memory recording, drives a `ReplayController` one tick at a
//! time without any pacing, and prints each classification. Useful for
//! checking limits against a recording before watching it live.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example memory_source
//! ```

use std::sync::Arc;
use std::time::Duration;

use motorwatch::{
    MemorySink, Reading, ReplayController, SharedThresholds, ThresholdConfig, ThresholdName,
    TickOutcome, VecSource,
};

fn main() {
    let readings = vec![
        Reading::new("10", 30.0, 1.0, 1.0),
        Reading::new("20", 70.0, 1.0, 1.0),
        Reading::new("30", 50.0, 3.0, 1.0),
        Reading::new("40", 58.0, 2.0, 2.9),
    ];

    let thresholds = SharedThresholds::new(ThresholdConfig::default());
    let sink = MemorySink::new();
    let mut controller = ReplayController::new(
        Arc::new(VecSource::new(readings)),
        thresholds.clone(),
        Box::new(sink.clone()),
        60,
    );

    controller.start(Duration::ZERO);
    while let Ok(TickOutcome::Emitted { cursor }) = controller.step() {
        // Loosen the vibration limit halfway through; the next tick sees it
        if cursor == 2 {
            let update = thresholds.set(ThresholdName::Vibration, 3.0);
            println!("  vibration limit -> {}", update.applied);
        }
    }

    for snapshot in sink.snapshots() {
        let reading = &snapshot.reading;
        let verdict = if snapshot.is_fault() {
            snapshot.classification.codes().join(", ")
        } else {
            "normal".to_string()
        };
        println!(
            "t={:>3}  temp {:>5.1}  x {:.2}  z {:.2}  -> {}",
            reading.timestamp,
            reading.temperature,
            reading.vibration_x,
            reading.vibration_z,
            verdict
        );
    }

    println!("Session ended: {}", controller.state().label());
}
