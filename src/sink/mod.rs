//! Display sinks for per-tick state snapshots.
//!
//! The replay controller hands one [`TickSnapshot`] to its sink on every
//! tick. Sinks are best-effort: a delivery failure is logged by the
//! controller and the replay carries on.

mod channel;
mod memory;
mod stream;

pub use channel::{SnapshotFeed, WatchSink};
pub use memory::MemorySink;
pub use stream::JsonLinesSink;

use std::fmt::Debug;
use std::sync::Arc;

use serde::Serialize;

use crate::data::{Classification, ThresholdConfig};
use crate::error::SinkError;
use crate::source::Reading;

/// Everything the display needs for one tick.
#[derive(Debug, Clone, Serialize)]
pub struct TickSnapshot {
    /// 1-based tick number within the session (equals the cursor after the tick).
    pub tick: usize,
    /// 0-based index of `reading` in the source.
    pub index: usize,
    /// Number of readings in the source.
    pub total: usize,
    /// The reading pulled on this tick.
    pub reading: Arc<Reading>,
    /// Rolling window contents, oldest first, ending with `reading`.
    pub window: Vec<Arc<Reading>>,
    pub classification: Classification,
    /// The limits `classification` was computed against.
    pub thresholds: ThresholdConfig,
}

impl TickSnapshot {
    pub fn is_fault(&self) -> bool {
        self.classification.is_fault
    }

    /// Fraction of the source consumed, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.tick as f64 / self.total as f64
        }
    }
}

/// Trait for consumers of tick snapshots.
///
/// `deliver` is called synchronously on the replay task and must return
/// promptly; queueing or redraw throttling is the sink's own business.
pub trait SnapshotSink: Send + Debug {
    fn deliver(&mut self, snapshot: TickSnapshot) -> Result<(), SinkError>;

    /// Returns a human-readable description of the sink.
    fn description(&self) -> &str;
}

#[cfg(test)]
pub(crate) fn sample_snapshot(tick: usize) -> TickSnapshot {
    let reading = Arc::new(Reading::new(tick.to_string(), 50.0, 1.0, 1.0));
    TickSnapshot {
        tick,
        index: tick.saturating_sub(1),
        total: 10,
        reading: Arc::clone(&reading),
        window: vec![reading],
        classification: Classification::normal(),
        thresholds: ThresholdConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress() {
        let snapshot = sample_snapshot(5);
        assert_eq!(snapshot.progress(), 0.5);
        assert!(!snapshot.is_fault());
    }
}
