//! In-memory display sink.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::time::Instant;

use super::{SnapshotSink, TickSnapshot};
use crate::error::SinkError;

/// A sink that keeps every snapshot it receives along with its arrival time.
///
/// Clones share the same buffer, so a caller can keep one clone for
/// inspection while the controller owns the other.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    received: Arc<Mutex<Vec<(Instant, TickSnapshot)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.received.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.received.lock().is_empty()
    }

    /// Copies of all snapshots received so far.
    pub fn snapshots(&self) -> Vec<TickSnapshot> {
        self.received.lock().iter().map(|(_, s)| s.clone()).collect()
    }

    /// Arrival times, in delivery order.
    pub fn arrival_times(&self) -> Vec<Instant> {
        self.received.lock().iter().map(|(t, _)| *t).collect()
    }

    pub fn clear(&self) {
        self.received.lock().clear();
    }
}

impl SnapshotSink for MemorySink {
    fn deliver(&mut self, snapshot: TickSnapshot) -> Result<(), SinkError> {
        self.received.lock().push((Instant::now(), snapshot));
        Ok(())
    }

    fn description(&self) -> &str {
        "memory"
    }
}
