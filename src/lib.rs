//! # motorwatch
//!
//! Replays recorded motor sensor readings (temperature plus X/Z vibration
//! amplitude) at a fixed pace, classifies each one against operator-set
//! limits, and shows the result in a terminal dashboard.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐  start/stop   ┌──────────┐  TickSnapshot        │
//! │  │  app    │──thresholds──▶│  replay  │──────────┐           │
//! │  │ (state) │               │ (pacing) │          ▼           │
//! │  └────▲────┘               └────┬─────┘     ┌─────────┐      │
//! │       │                         │ pull      │  sink   │      │
//! │       │ SnapshotFeed            ▼           └────┬────┘      │
//! │  ┌────┴────┐               ┌─────────┐           │           │
//! │  │   ui    │◀──────────────│ source  │           │           │
//! │  └─────────┘               └─────────┘◀── FileSource | VecSource
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: The [`ReadingSource`] trait and its CSV/JSON and
//!   in-memory implementations
//! - **[`data`]**: Thresholds, the evaluator, and the rolling window
//! - **[`replay`]**: The tick state machine ([`ReplayController`]) and the
//!   operator handle that paces it on a tokio task ([`Replayer`])
//! - **[`sink`]**: Where snapshots go: a watch channel for the TUI, JSON
//!   lines for headless runs, memory for tests
//! - **[`app`]** / **[`ui`]**: Dashboard state and ratatui rendering
//! - **[`report`]**: Unpaced whole-recording evaluation for `--export`
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Interactive dashboard, one reading per second
//! motorwatch --data motor_data.csv
//!
//! # Stream snapshots as JSON lines
//! motorwatch --data motor_data.csv --interval 200ms --headless
//!
//! # Evaluate the whole recording and write a report
//! motorwatch --data motor_data.csv --export report.json
//! ```
//!
//! ### As a library
//!
//! ```
//! use motorwatch::{evaluate, Reading, ReadingSource, ThresholdConfig, VecSource};
//!
//! let source = VecSource::new(vec![Reading::new("10", 65.0, 1.0, 3.2)]);
//! let reading = source.reading(0).unwrap();
//! let result = evaluate(&reading, &ThresholdConfig::default());
//! assert!(result.is_fault);
//! assert_eq!(result.reasons.len(), 2);
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod replay;
pub mod report;
pub mod sink;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::Settings;
pub use data::{
    evaluate, Classification, FaultReason, RollingWindow, SharedThresholds, ThresholdConfig,
    ThresholdName, ThresholdUpdate, NORMAL_MESSAGE,
};
pub use error::{ReplayError, SinkError, SourceError};
pub use replay::{ReplayController, ReplayState, ReplayStatus, Replayer, TickOutcome};
pub use report::EvaluationReport;
pub use sink::{JsonLinesSink, MemorySink, SnapshotFeed, SnapshotSink, TickSnapshot, WatchSink};
pub use source::{DataFormat, FileSource, Reading, ReadingSource, VecSource};
