//! Application state and operator actions for the dashboard.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::data::{ThresholdConfig, ThresholdName};
use crate::replay::{ReplayState, ReplayStatus, Replayer};
use crate::sink::{SnapshotFeed, TickSnapshot};
use crate::ui::Theme;

/// How long a status message stays in the status bar.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The trend chart currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// X and Z vibration against the vibration limit.
    Vibration,
    /// Temperature against the overheat limit.
    Temperature,
}

impl View {
    pub fn next(self) -> Self {
        match self {
            View::Vibration => View::Temperature,
            View::Temperature => View::Vibration,
        }
    }

    // Two tabs: previous and next coincide.
    pub fn prev(self) -> Self {
        self.next()
    }

    pub fn label(&self) -> &'static str {
        match self {
            View::Vibration => "Vibration",
            View::Temperature => "Temperature",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    replayer: Replayer,
    feed: SnapshotFeed,
    interval: Duration,

    /// Most recent snapshot received from the replay.
    pub latest: Option<Arc<TickSnapshot>>,
    /// Faulty snapshots the display has picked up this session. Snapshots
    /// overwritten between redraws are not counted.
    pub fault_count: usize,

    pub theme: Theme,
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create an app over a replayer whose sink feeds `feed`.
    pub fn new(replayer: Replayer, feed: SnapshotFeed, interval: Duration) -> Self {
        Self::with_theme(replayer, feed, interval, Theme::auto_detect())
    }

    pub fn with_theme(
        replayer: Replayer,
        feed: SnapshotFeed,
        interval: Duration,
        theme: Theme,
    ) -> Self {
        Self {
            running: true,
            current_view: View::Vibration,
            show_help: false,
            replayer,
            feed,
            interval,
            latest: None,
            fault_count: 0,
            theme,
            status_message: None,
        }
    }

    pub fn source_description(&self) -> String {
        self.replayer.source_description()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn replay_state(&self) -> ReplayState {
        self.replayer.state()
    }

    pub fn replay_status(&self) -> ReplayStatus {
        self.replayer.status()
    }

    /// Live thresholds; these may differ from the ones the latest snapshot
    /// was evaluated against until the next tick.
    pub fn thresholds(&self) -> ThresholdConfig {
        self.replayer.thresholds()
    }

    /// Pick up a new snapshot from the feed.
    ///
    /// Returns true if the display needs the new data.
    pub fn refresh(&mut self) -> bool {
        let Some(snapshot) = self.feed.poll() else {
            return false;
        };
        if snapshot.is_fault() {
            self.fault_count += 1;
        }
        self.latest = Some(snapshot);
        true
    }

    /// Start a fresh session, clearing what the display kept from the last one.
    pub fn start(&mut self) {
        if self.replayer.state().is_running() {
            self.set_status_message("Replay already running".to_string());
            return;
        }

        // Drop an unseen snapshot left over from the previous session
        let _ = self.feed.poll();
        self.latest = None;
        self.fault_count = 0;

        if self.replayer.start(self.interval) {
            self.set_status_message("Replay started".to_string());
        } else {
            self.set_status_message("Replay already running".to_string());
        }
    }

    pub fn stop(&mut self) {
        if self.replayer.state().is_running() {
            self.replayer.stop();
            self.set_status_message("Stopping after current tick".to_string());
        } else {
            self.set_status_message("Replay is not running".to_string());
        }
    }

    /// Nudge a limit by `steps` increments and report the result.
    pub fn adjust_threshold(&mut self, name: ThresholdName, steps: i32) {
        let update = self.replayer.adjust_threshold(name, steps);
        let range = name.range();
        let message = if update.was_clamped() {
            format!(
                "{} limit {} (range {}..{})",
                capitalize(name.label()),
                format_limit(name, update.applied),
                format_limit(name, *range.start()),
                format_limit(name, *range.end()),
            )
        } else {
            format!(
                "{} limit {}",
                capitalize(name.label()),
                format_limit(name, update.applied)
            )
        };
        self.set_status_message(message);
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// The current status message, if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Write the latest snapshot plus session status to a JSON file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        use std::io::Write;

        let Some(ref snapshot) = self.latest else {
            anyhow::bail!("No snapshot to export yet");
        };

        let export = serde_json::json!({
            "source": self.source_description(),
            "status": self.replay_status(),
            "thresholds": self.thresholds(),
            "faults_seen": self.fault_count,
            "snapshot": snapshot,
        });

        let json = serde_json::to_string_pretty(&export)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

/// Format a limit with the precision its step allows.
pub fn format_limit(name: ThresholdName, value: f64) -> String {
    match name {
        ThresholdName::Temperature => format!("{:.0}°C", value),
        ThresholdName::Vibration => format!("{:.1}", value),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
