//! Operator-facing replay handle and the pacing driver.
//!
//! [`Replayer`] is the control boundary: `start`, `stop` and
//! `set_threshold` may be called from any thread. Each started session runs
//! on a tokio task that steps the shared [`ReplayController`] and sleeps for
//! the configured interval between ticks.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::controller::{ReplayController, ReplayState, StopSignal, TickOutcome};
use crate::data::{
    SharedThresholds, ThresholdConfig, ThresholdName, ThresholdUpdate, UnknownThreshold,
};
use crate::error::ReplayError;

/// Point-in-time view of a session, taken under one lock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayStatus {
    pub state: ReplayState,
    pub cursor: usize,
    pub total: usize,
    #[serde(with = "interval_millis")]
    pub interval: Duration,
    pub stop_pending: bool,
    pub last_error: Option<String>,
}

mod interval_millis {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }
}

/// Drive a controller until its session ends.
///
/// One suspension point per tick: the sleep after an emitted snapshot. A
/// stop requested during that sleep is seen by the next `step`.
pub async fn drive(controller: Arc<Mutex<ReplayController>>) -> Result<ReplayState, ReplayError> {
    loop {
        let (outcome, state, interval) = {
            let mut ctl = controller.lock();
            let outcome = ctl.step();
            (outcome, ctl.state(), ctl.interval())
        };

        match outcome? {
            TickOutcome::Emitted { .. } if state.is_running() => {
                tokio::time::sleep(interval).await;
            }
            TickOutcome::Emitted { .. } | TickOutcome::Halted(_) => return Ok(state),
        }
    }
}

/// Thread-safe operator handle over a replay controller.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use motorwatch::{MemorySink, Reading, ReplayState, Replayer, SharedThresholds, VecSource};
///
/// # tokio_test::block_on(async {
/// let sink = MemorySink::new();
/// let replayer = Replayer::new(
///     Arc::new(VecSource::new(vec![Reading::new("10", 30.0, 1.0, 1.0)])),
///     SharedThresholds::default(),
///     Box::new(sink.clone()),
///     60,
///     tokio::runtime::Handle::current(),
/// );
/// replayer.start(Duration::from_millis(1));
/// assert_eq!(replayer.wait().await, ReplayState::Completed);
/// assert_eq!(sink.len(), 1);
/// # });
/// ```
#[derive(Debug)]
pub struct Replayer {
    controller: Arc<Mutex<ReplayController>>,
    stop: StopSignal,
    thresholds: SharedThresholds,
    runtime: Handle,
    task: Mutex<Option<JoinHandle<Result<ReplayState, ReplayError>>>>,
}

impl Replayer {
    /// Create an idle replayer. Sessions are spawned on `runtime`.
    pub fn new(
        source: Arc<dyn crate::source::ReadingSource>,
        thresholds: SharedThresholds,
        sink: Box<dyn crate::sink::SnapshotSink>,
        window_capacity: usize,
        runtime: Handle,
    ) -> Self {
        let controller = ReplayController::new(source, thresholds.clone(), sink, window_capacity);
        Self::from_controller(controller, runtime)
    }

    pub fn from_controller(controller: ReplayController, runtime: Handle) -> Self {
        let stop = controller.stop_signal();
        let thresholds = controller.thresholds().clone();
        Self {
            controller: Arc::new(Mutex::new(controller)),
            stop,
            thresholds,
            runtime,
            task: Mutex::new(None),
        }
    }

    /// Start a session paced at `interval`.
    ///
    /// Returns false without side effects if a session is already running.
    pub fn start(&self, interval: Duration) -> bool {
        if !self.controller.lock().start(interval) {
            return false;
        }
        let controller = Arc::clone(&self.controller);
        let handle = self.runtime.spawn(drive(controller));
        *self.task.lock() = Some(handle);
        true
    }

    /// Request a stop; takes effect at the next tick boundary.
    ///
    /// Never waits on an in-flight tick.
    pub fn stop(&self) {
        self.stop.request();
        info!("stop requested");
    }

    /// Update a limit. Out-of-range values are clamped.
    pub fn set_threshold(&self, name: ThresholdName, value: f64) -> ThresholdUpdate {
        self.thresholds.set(name, value)
    }

    /// Update a limit by its textual name.
    pub fn set_threshold_by_name(
        &self,
        name: &str,
        value: f64,
    ) -> Result<ThresholdUpdate, UnknownThreshold> {
        Ok(self.set_threshold(name.parse()?, value))
    }

    /// Nudge a limit by `steps` operator increments.
    pub fn adjust_threshold(&self, name: ThresholdName, steps: i32) -> ThresholdUpdate {
        self.thresholds.adjust(name, steps)
    }

    pub fn thresholds(&self) -> ThresholdConfig {
        self.thresholds.snapshot()
    }

    pub fn state(&self) -> ReplayState {
        self.controller.lock().state()
    }

    pub fn status(&self) -> ReplayStatus {
        let ctl = self.controller.lock();
        ReplayStatus {
            state: ctl.state(),
            cursor: ctl.cursor(),
            total: ctl.source().len(),
            interval: ctl.interval(),
            stop_pending: ctl.stop_pending(),
            last_error: ctl.last_error().map(ToString::to_string),
        }
    }

    pub fn source_description(&self) -> String {
        self.controller.lock().source().description().to_string()
    }

    /// Wait for the current session's task to finish and return its final state.
    ///
    /// Returns the current state immediately if no session task is pending.
    /// A task that panicked or was cancelled leaves the session
    /// [`ReplayState::Failed`].
    pub async fn wait(&self) -> ReplayState {
        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(err) = task.await {
                error!(error = %err, "replay task did not finish");
                self.controller
                    .lock()
                    .abandon(ReplayError::DriverAborted(err.to_string()));
            }
        }
        self.state()
    }
}

impl Drop for Replayer {
    fn drop(&mut self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;
    use crate::sink::{MemorySink, SnapshotSink, TickSnapshot};
    use crate::source::{Reading, VecSource};

    fn readings(n: usize) -> Vec<Reading> {
        (0..n)
            .map(|i| Reading::new((i * 10).to_string(), 50.0, 1.0, 1.0))
            .collect()
    }

    fn replayer_with(n: usize) -> (Replayer, MemorySink) {
        let sink = MemorySink::new();
        let replayer = Replayer::new(
            Arc::new(VecSource::new(readings(n))),
            SharedThresholds::default(),
            Box::new(sink.clone()),
            60,
            Handle::current(),
        );
        (replayer, sink)
    }

    #[tokio::test(start_paused = true)]
    async fn test_emits_one_snapshot_per_reading_paced_by_interval() {
        let interval = Duration::from_millis(200);
        let (replayer, sink) = replayer_with(5);

        assert!(replayer.start(interval));
        assert_eq!(replayer.wait().await, ReplayState::Completed);

        let snapshots = sink.snapshots();
        assert_eq!(snapshots.len(), 5);
        for pair in snapshots.windows(2) {
            assert!(pair[1].tick > pair[0].tick);
        }

        let times = sink.arrival_times();
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= interval);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_by_next_tick() {
        let interval = Duration::from_millis(100);
        let (replayer, sink) = replayer_with(10);

        replayer.start(interval);
        // Ticks land at 0, 100 and 200ms; stop arrives mid-wait.
        tokio::time::sleep(Duration::from_millis(250)).await;
        replayer.stop();
        assert!(replayer.status().stop_pending);

        assert_eq!(replayer.wait().await, ReplayState::Stopped);
        assert_eq!(sink.len(), 3);
        assert_eq!(replayer.status().cursor, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_while_running_does_not_add_a_cursor() {
        let (replayer, sink) = replayer_with(4);

        assert!(replayer.start(Duration::from_millis(50)));
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!replayer.start(Duration::from_millis(50)));

        replayer.wait().await;
        let ticks: Vec<usize> = sink.snapshots().iter().map(|s| s.tick).collect();
        assert_eq!(ticks, vec![1, 2, 3, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_completion() {
        let (replayer, sink) = replayer_with(3);

        replayer.start(Duration::from_millis(10));
        replayer.wait().await;
        sink.clear();

        assert!(replayer.start(Duration::from_millis(10)));
        replayer.wait().await;

        let snapshots = sink.snapshots();
        assert_eq!(snapshots.len(), 3);
        assert_eq!(snapshots[0].tick, 1);
        assert_eq!(snapshots[0].window.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_threshold_by_name_clamps() {
        let (replayer, _) = replayer_with(1);

        let update = replayer.set_threshold_by_name("temperature", 120.0).unwrap();
        assert!(update.was_clamped());
        assert_eq!(replayer.thresholds().temperature_limit, 100.0);

        assert!(replayer.set_threshold_by_name("humidity", 1.0).is_err());
    }

    #[derive(Debug)]
    struct PanickingSink;

    impl SnapshotSink for PanickingSink {
        fn deliver(&mut self, _: TickSnapshot) -> Result<(), SinkError> {
            panic!("display crashed");
        }

        fn description(&self) -> &str {
            "panicking"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_driver_fails_the_session() {
        let replayer = Replayer::new(
            Arc::new(VecSource::new(readings(3))),
            SharedThresholds::default(),
            Box::new(PanickingSink),
            60,
            Handle::current(),
        );

        replayer.start(Duration::from_millis(10));
        assert_eq!(replayer.wait().await, ReplayState::Failed);

        let status = replayer.status();
        assert!(status.last_error.unwrap().contains("panicked"));
        // The session can be started again afterwards
        assert!(replayer.start(Duration::from_millis(10)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_reports_progress() {
        let (replayer, _) = replayer_with(2);
        let status = replayer.status();
        assert_eq!(status.state, ReplayState::Idle);
        assert_eq!(status.total, 2);
        assert!(status.last_error.is_none());

        replayer.start(Duration::from_millis(5));
        replayer.wait().await;
        let status = replayer.status();
        assert_eq!(status.state, ReplayState::Completed);
        assert_eq!(status.cursor, 2);
    }
}
