//! Bounded FIFO of the most recent readings, used for trend charts.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::source::Reading;

/// Default number of readings kept for trend display.
pub const DEFAULT_WINDOW_CAPACITY: usize = 60;

/// Fixed-capacity window over the latest readings.
///
/// Pushing beyond capacity evicts the oldest entry. The capacity is fixed
/// for the lifetime of the window; a new capacity needs a new window.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    readings: VecDeque<Arc<Reading>>,
    capacity: usize,
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}

impl RollingWindow {
    /// Create an empty window. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            readings: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a reading, evicting the oldest if the window is full.
    pub fn push(&mut self, reading: Arc<Reading>) {
        self.readings.push_back(reading);
        if self.readings.len() > self.capacity {
            self.readings.pop_front();
        }
    }

    /// The current contents in arrival order.
    pub fn snapshot(&self) -> Vec<Arc<Reading>> {
        self.readings.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Reading>> {
        self.readings.iter()
    }

    pub fn latest(&self) -> Option<&Arc<Reading>> {
        self.readings.back()
    }

    pub fn clear(&mut self) {
        self.readings.clear();
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(i: usize) -> Arc<Reading> {
        Arc::new(Reading::new(i.to_string(), 50.0, 1.0, 1.0))
    }

    #[test]
    fn test_push_within_capacity() {
        let mut window = RollingWindow::new(3);
        window.push(reading(0));
        window.push(reading(1));
        assert_eq!(window.len(), 2);
        assert_eq!(window.latest().unwrap().timestamp, "1");
    }

    #[test]
    fn test_keeps_last_capacity_in_arrival_order() {
        let mut window = RollingWindow::new(5);
        for i in 0..12 {
            window.push(reading(i));
            assert!(window.len() <= 5);
        }
        let stamps: Vec<String> = window.snapshot().iter().map(|r| r.timestamp.clone()).collect();
        assert_eq!(stamps, vec!["7", "8", "9", "10", "11"]);
    }

    #[test]
    fn test_snapshot_does_not_mutate() {
        let mut window = RollingWindow::new(2);
        window.push(reading(0));
        let _ = window.snapshot();
        let _ = window.snapshot();
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let mut window = RollingWindow::new(0);
        assert_eq!(window.capacity(), 1);
        window.push(reading(0));
        window.push(reading(1));
        assert_eq!(window.len(), 1);
        assert_eq!(window.latest().unwrap().timestamp, "1");
    }

    #[test]
    fn test_clear() {
        let mut window = RollingWindow::default();
        assert_eq!(window.capacity(), DEFAULT_WINDOW_CAPACITY);
        window.push(reading(0));
        window.clear();
        assert!(window.is_empty());
    }
}
