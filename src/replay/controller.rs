//! The replay state machine.
//!
//! [`ReplayController`] owns one session's cursor, rolling window and sink.
//! It knows nothing about time: each call to [`ReplayController::step`]
//! performs exactly one tick, and pacing is left to the driver in
//! [`super::replayer`]. That keeps the state machine testable without a
//! clock or a display.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::data::{evaluate, RollingWindow, SharedThresholds};
use crate::error::ReplayError;
use crate::sink::{SnapshotSink, TickSnapshot};
use crate::source::ReadingSource;

/// Default pause between ticks.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Lifecycle of a replay session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayState {
    /// No session has been started yet.
    Idle,
    /// Ticking through the source.
    Running,
    /// Halted by the operator.
    Stopped,
    /// Reached the end of the source.
    Completed,
    /// Halted by a malformed reading.
    Failed,
}

impl ReplayState {
    pub fn is_running(self) -> bool {
        self == ReplayState::Running
    }

    /// True for states a session ends in.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ReplayState::Stopped | ReplayState::Completed | ReplayState::Failed
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            ReplayState::Idle => "IDLE",
            ReplayState::Running => "RUNNING",
            ReplayState::Stopped => "STOPPED",
            ReplayState::Completed => "COMPLETED",
            ReplayState::Failed => "FAILED",
        }
    }
}

/// Cooperative cancellation flag, sampled once per tick.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// What a single call to [`ReplayController::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A reading was evaluated and a snapshot emitted; `cursor` is the new position.
    Emitted { cursor: usize },
    /// No reading was pulled; the session is (now) in the given state.
    Halted(ReplayState),
}

/// Replay session state machine.
#[derive(Debug)]
pub struct ReplayController {
    source: Arc<dyn ReadingSource>,
    thresholds: SharedThresholds,
    sink: Box<dyn SnapshotSink>,
    window: RollingWindow,
    state: ReplayState,
    cursor: usize,
    interval: Duration,
    stop: StopSignal,
    last_error: Option<ReplayError>,
    sink_failures: u64,
}

impl ReplayController {
    /// Create an idle controller.
    ///
    /// The window capacity is fixed for every session run by this controller.
    pub fn new(
        source: Arc<dyn ReadingSource>,
        thresholds: SharedThresholds,
        sink: Box<dyn SnapshotSink>,
        window_capacity: usize,
    ) -> Self {
        Self {
            source,
            thresholds,
            sink,
            window: RollingWindow::new(window_capacity),
            state: ReplayState::Idle,
            cursor: 0,
            interval: DEFAULT_INTERVAL,
            stop: StopSignal::default(),
            last_error: None,
            sink_failures: 0,
        }
    }

    /// Begin a fresh session.
    ///
    /// Resets the cursor to 0 and clears the window. Returns false, changing
    /// nothing, if a session is already running.
    pub fn start(&mut self, interval: Duration) -> bool {
        if self.state.is_running() {
            debug!(cursor = self.cursor, "start ignored, replay already running");
            return false;
        }

        self.cursor = 0;
        self.window.clear();
        self.interval = interval;
        self.stop.reset();
        self.last_error = None;
        self.state = ReplayState::Running;

        info!(
            source = self.source.description(),
            readings = self.source.len(),
            interval_ms = interval.as_millis() as u64,
            "replay started"
        );
        true
    }

    /// Ask the session to stop at the next tick boundary.
    pub fn request_stop(&self) {
        if self.state.is_running() {
            self.stop.request();
        }
    }

    /// Perform one tick.
    ///
    /// Order within a tick: honour a pending stop, detect exhaustion, pull
    /// the reading at the cursor, advance the cursor, push to the window,
    /// evaluate against a fresh copy of the thresholds, emit. A malformed
    /// reading moves the session to [`ReplayState::Failed`] and is returned
    /// as an error.
    pub fn step(&mut self) -> Result<TickOutcome, ReplayError> {
        if !self.state.is_running() {
            return Ok(TickOutcome::Halted(self.state));
        }

        if self.stop.is_requested() {
            self.finish(ReplayState::Stopped);
            return Ok(TickOutcome::Halted(self.state));
        }

        let total = self.source.len();
        if self.cursor >= total {
            self.finish(ReplayState::Completed);
            return Ok(TickOutcome::Halted(self.state));
        }

        let index = self.cursor;
        let reading = match self.source.reading(index) {
            Ok(reading) => reading,
            Err(err) => {
                let err = ReplayError::from_source(index, err);
                error!(index, error = %err, "halting replay");
                self.last_error = Some(err.clone());
                self.finish(ReplayState::Failed);
                return Err(err);
            }
        };

        self.cursor += 1;
        self.window.push(Arc::clone(&reading));

        let thresholds = self.thresholds.snapshot();
        let classification = evaluate(&reading, &thresholds);
        debug!(
            tick = self.cursor,
            timestamp = %reading.timestamp,
            fault = classification.is_fault,
            "tick"
        );

        self.emit(TickSnapshot {
            tick: self.cursor,
            index,
            total,
            reading,
            window: self.window.snapshot(),
            classification,
            thresholds,
        });

        if self.cursor >= total {
            self.finish(ReplayState::Completed);
        }

        Ok(TickOutcome::Emitted {
            cursor: self.cursor,
        })
    }

    fn emit(&mut self, snapshot: TickSnapshot) {
        if let Err(err) = self.sink.deliver(snapshot) {
            self.sink_failures += 1;
            warn!(
                sink = self.sink.description(),
                error = %err,
                "snapshot not delivered, continuing"
            );
        }
    }

    fn finish(&mut self, state: ReplayState) {
        self.state = state;
        info!(state = state.label(), cursor = self.cursor, "replay session ended");
    }

    pub fn state(&self) -> ReplayState {
        self.state
    }

    /// Number of readings consumed in the current session.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn window(&self) -> &RollingWindow {
        &self.window
    }

    pub fn source(&self) -> &Arc<dyn ReadingSource> {
        &self.source
    }

    pub fn thresholds(&self) -> &SharedThresholds {
        &self.thresholds
    }

    /// The error that failed the last session, if any.
    pub fn last_error(&self) -> Option<&ReplayError> {
        self.last_error.as_ref()
    }

    /// True when a stop was requested but not yet observed.
    pub fn stop_pending(&self) -> bool {
        self.state.is_running() && self.stop.is_requested()
    }

    /// Snapshots the sink failed to accept over the controller's lifetime.
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures
    }

    /// Fail a session whose driver went away while it was still running.
    pub(crate) fn abandon(&mut self, err: ReplayError) {
        if !self.state.is_running() {
            return;
        }
        error!(cursor = self.cursor, error = %err, "replay driver lost");
        self.last_error = Some(err);
        self.finish(ReplayState::Failed);
    }

    pub(crate) fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ThresholdConfig, ThresholdName};
    use crate::error::SinkError;
    use crate::sink::MemorySink;
    use crate::source::{FileSource, Reading, VecSource};

    fn reference_readings() -> Vec<Reading> {
        vec![
            Reading::new("10", 30.0, 1.0, 1.0),
            Reading::new("20", 70.0, 1.0, 1.0),
            Reading::new("30", 50.0, 3.0, 1.0),
        ]
    }

    fn controller_with(
        readings: Vec<Reading>,
        capacity: usize,
    ) -> (ReplayController, MemorySink, SharedThresholds) {
        let sink = MemorySink::new();
        let thresholds = SharedThresholds::new(ThresholdConfig::new(60.0, 2.8));
        let controller = ReplayController::new(
            Arc::new(VecSource::new(readings)),
            thresholds.clone(),
            Box::new(sink.clone()),
            capacity,
        );
        (controller, sink, thresholds)
    }

    fn run_to_end(controller: &mut ReplayController) {
        while let Ok(TickOutcome::Emitted { .. }) = controller.step() {}
    }

    #[derive(Debug)]
    struct BrokenSink;

    impl SnapshotSink for BrokenSink {
        fn deliver(&mut self, _snapshot: TickSnapshot) -> Result<(), SinkError> {
            Err(SinkError::Unavailable("display closed".to_string()))
        }

        fn description(&self) -> &str {
            "broken"
        }
    }

    #[test]
    fn test_idle_until_started() {
        let (mut controller, sink, _) = controller_with(reference_readings(), 10);
        assert_eq!(controller.state(), ReplayState::Idle);
        assert_eq!(controller.step().unwrap(), TickOutcome::Halted(ReplayState::Idle));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_reference_replay_classifications() {
        let (mut controller, sink, _) = controller_with(reference_readings(), 10);
        assert!(controller.start(Duration::from_millis(10)));
        run_to_end(&mut controller);

        assert_eq!(controller.state(), ReplayState::Completed);
        assert_eq!(controller.cursor(), 3);

        let snapshots = sink.snapshots();
        assert_eq!(snapshots.len(), 3);
        let codes: Vec<Vec<&str>> =
            snapshots.iter().map(|s| s.classification.codes()).collect();
        assert_eq!(
            codes,
            vec![vec![], vec!["temperature-overheat"], vec!["vibration-anomaly"]]
        );

        let ticks: Vec<usize> = snapshots.iter().map(|s| s.tick).collect();
        assert_eq!(ticks, vec![1, 2, 3]);
        assert_eq!(snapshots[2].window.len(), 3);
        assert_eq!(snapshots[2].total, 3);
    }

    #[test]
    fn test_completes_right_after_last_snapshot() {
        let (mut controller, _, _) = controller_with(reference_readings(), 10);
        controller.start(Duration::ZERO);
        controller.step().unwrap();
        controller.step().unwrap();
        assert_eq!(controller.step().unwrap(), TickOutcome::Emitted { cursor: 3 });
        assert_eq!(controller.state(), ReplayState::Completed);
        assert_eq!(controller.step().unwrap(), TickOutcome::Halted(ReplayState::Completed));
    }

    #[test]
    fn test_empty_source_completes_without_snapshots() {
        let (mut controller, sink, _) = controller_with(Vec::new(), 10);
        controller.start(Duration::ZERO);
        assert_eq!(controller.step().unwrap(), TickOutcome::Halted(ReplayState::Completed));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_start_while_running_is_noop() {
        let (mut controller, _, _) = controller_with(reference_readings(), 10);
        assert!(controller.start(Duration::from_millis(5)));
        controller.step().unwrap();
        assert!(!controller.start(Duration::from_millis(50)));
        assert_eq!(controller.cursor(), 1);
        assert_eq!(controller.interval(), Duration::from_millis(5));
    }

    #[test]
    fn test_stop_observed_at_next_tick_boundary() {
        let (mut controller, sink, _) = controller_with(reference_readings(), 10);
        controller.start(Duration::ZERO);
        controller.step().unwrap();

        controller.request_stop();
        assert_eq!(controller.state(), ReplayState::Running);
        assert!(controller.stop_pending());

        assert_eq!(controller.step().unwrap(), TickOutcome::Halted(ReplayState::Stopped));
        assert!(!controller.stop_pending());
        assert_eq!(sink.len(), 1);
        assert_eq!(controller.cursor(), 1);
    }

    #[test]
    fn test_restart_after_completion_resets_cursor_and_window() {
        let (mut controller, sink, _) = controller_with(reference_readings(), 10);
        controller.start(Duration::ZERO);
        run_to_end(&mut controller);
        sink.clear();

        assert!(controller.start(Duration::ZERO));
        assert_eq!(controller.cursor(), 0);
        assert!(controller.window().is_empty());

        controller.step().unwrap();
        let first = &sink.snapshots()[0];
        assert_eq!(first.tick, 1);
        assert_eq!(first.window.len(), 1);
        assert_eq!(first.reading.timestamp, "10");
    }

    #[test]
    fn test_restart_after_stop_clears_stop_flag() {
        let (mut controller, _, _) = controller_with(reference_readings(), 10);
        controller.start(Duration::ZERO);
        controller.request_stop();
        controller.step().unwrap();
        assert_eq!(controller.state(), ReplayState::Stopped);

        assert!(controller.start(Duration::ZERO));
        assert_eq!(controller.step().unwrap(), TickOutcome::Emitted { cursor: 1 });
    }

    #[test]
    fn test_window_bounded_during_replay() {
        let readings: Vec<Reading> =
            (0..8).map(|i| Reading::new(i.to_string(), 50.0, 1.0, 1.0)).collect();
        let (mut controller, sink, _) = controller_with(readings, 3);
        controller.start(Duration::ZERO);
        run_to_end(&mut controller);

        for snapshot in sink.snapshots() {
            assert!(snapshot.window.len() <= 3);
            assert_eq!(snapshot.window.last().unwrap(), &snapshot.reading);
        }
        let last = sink.snapshots().pop().unwrap();
        let stamps: Vec<&str> = last.window.iter().map(|r| r.timestamp.as_str()).collect();
        assert_eq!(stamps, vec!["5", "6", "7"]);
    }

    #[test]
    fn test_threshold_change_visible_on_next_tick() {
        let readings = vec![
            Reading::new("1", 55.0, 1.0, 1.0),
            Reading::new("2", 55.0, 1.0, 1.0),
        ];
        let (mut controller, sink, thresholds) = controller_with(readings, 10);
        controller.start(Duration::ZERO);

        controller.step().unwrap();
        thresholds.set(ThresholdName::Temperature, 50.0);
        controller.step().unwrap();

        let snapshots = sink.snapshots();
        assert!(!snapshots[0].is_fault());
        assert!(snapshots[1].is_fault());
        assert_eq!(snapshots[1].thresholds.temperature_limit, 50.0);
    }

    #[test]
    fn test_sink_failure_does_not_stop_replay() {
        let mut controller = ReplayController::new(
            Arc::new(VecSource::new(reference_readings())),
            SharedThresholds::default(),
            Box::new(BrokenSink),
            10,
        );
        controller.start(Duration::ZERO);
        run_to_end(&mut controller);

        assert_eq!(controller.state(), ReplayState::Completed);
        assert_eq!(controller.cursor(), 3);
        assert_eq!(controller.sink_failures(), 3);
    }

    #[test]
    fn test_malformed_reading_fails_session() {
        let csv = "timestamp,temperature,vibration_x,vibration_z\n\
                   10,30,1.0,1.0\n\
                   20,n/a,1.0,1.0\n\
                   30,50,3.0,1.0\n";
        let source = FileSource::from_csv_reader(csv.as_bytes(), "test").unwrap();
        let sink = MemorySink::new();
        let mut controller = ReplayController::new(
            Arc::new(source),
            SharedThresholds::default(),
            Box::new(sink.clone()),
            10,
        );
        controller.start(Duration::ZERO);

        assert!(controller.step().is_ok());
        let err = controller.step().unwrap_err();
        assert_eq!(err.index(), Some(1));
        assert_eq!(controller.state(), ReplayState::Failed);
        assert_eq!(controller.last_error(), Some(&err));
        assert_eq!(controller.cursor(), 1);
        assert_eq!(sink.len(), 1);

        // No further ticks after a failure
        assert_eq!(controller.step().unwrap(), TickOutcome::Halted(ReplayState::Failed));
    }
}
