//! Channel-based display sink.
//!
//! Publishes snapshots on a tokio watch channel. The TUI keeps the
//! receiving end and picks up the latest snapshot on each redraw, so a slow
//! display never backs up the replay: intermediate snapshots are simply
//! overwritten.

use std::sync::Arc;

use tokio::sync::watch;

use super::{SnapshotSink, TickSnapshot};
use crate::error::SinkError;

/// A sink that publishes the latest snapshot on a watch channel.
///
/// # Example
///
/// ```
/// use motorwatch::WatchSink;
///
/// let (sink, mut feed) = WatchSink::create("tui");
/// assert!(feed.poll().is_none());
/// ```
#[derive(Debug)]
pub struct WatchSink {
    sender: watch::Sender<Option<Arc<TickSnapshot>>>,
    description: String,
}

impl WatchSink {
    /// Create a sink and the feed that reads from it.
    pub fn create(description: &str) -> (Self, SnapshotFeed) {
        let (tx, rx) = watch::channel(None);
        let sink = Self {
            sender: tx,
            description: format!("channel: {}", description),
        };
        (sink, SnapshotFeed { receiver: rx })
    }
}

impl SnapshotSink for WatchSink {
    fn deliver(&mut self, snapshot: TickSnapshot) -> Result<(), SinkError> {
        self.sender
            .send(Some(Arc::new(snapshot)))
            .map_err(|_| SinkError::Unavailable("all receivers dropped".to_string()))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Receiving end of a [`WatchSink`].
#[derive(Debug, Clone)]
pub struct SnapshotFeed {
    receiver: watch::Receiver<Option<Arc<TickSnapshot>>>,
}

impl SnapshotFeed {
    /// Return the newest snapshot if one arrived since the last poll.
    ///
    /// Non-blocking.
    pub fn poll(&mut self) -> Option<Arc<TickSnapshot>> {
        if self.receiver.has_changed().unwrap_or(false) {
            self.receiver.borrow_and_update().clone()
        } else {
            None
        }
    }

    /// The most recent snapshot regardless of whether it was already seen.
    pub fn latest(&self) -> Option<Arc<TickSnapshot>> {
        self.receiver.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::sample_snapshot;

    #[test]
    fn test_watch_sink_delivers_latest() {
        let (mut sink, mut feed) = WatchSink::create("test");
        assert_eq!(sink.description(), "channel: test");

        // Nothing sent yet
        assert!(feed.poll().is_none());

        sink.deliver(sample_snapshot(1)).unwrap();
        sink.deliver(sample_snapshot(2)).unwrap();

        // Only the newest survives
        let snapshot = feed.poll().unwrap();
        assert_eq!(snapshot.tick, 2);

        // No change since last poll
        assert!(feed.poll().is_none());
        assert_eq!(feed.latest().unwrap().tick, 2);
    }

    #[test]
    fn test_watch_sink_unavailable_when_feed_dropped() {
        let (mut sink, feed) = WatchSink::create("test");
        drop(feed);
        let err = sink.deliver(sample_snapshot(1)).unwrap_err();
        assert!(matches!(err, SinkError::Unavailable(_)));
    }
}
