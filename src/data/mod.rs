//! Data models and per-reading processing.
//!
//! ## Submodules
//!
//! - [`duration`]: Parsing and formatting of interval strings (e.g., "500ms", "1s")
//! - [`evaluator`]: Fixed-threshold classification ([`evaluate`], [`Classification`])
//! - [`thresholds`]: Operator limits and their clamping policy
//! - [`window`]: The bounded [`RollingWindow`] behind the trend charts
//!
//! ## Per-tick flow
//!
//! ```text
//! Reading (Arc)
//!    │
//!    ├──▶ RollingWindow::push()        (trend history)
//!    │
//!    └──▶ evaluate(reading, SharedThresholds::snapshot())
//!               │
//!               ▼
//!         Classification { is_fault, reasons }
//! ```

pub mod duration;
pub mod evaluator;
pub mod thresholds;
pub mod window;

pub use evaluator::{evaluate, Classification, FaultReason, NORMAL_MESSAGE};
pub use thresholds::{
    SharedThresholds, ThresholdConfig, ThresholdName, ThresholdUpdate, UnknownThreshold,
};
pub use window::{RollingWindow, DEFAULT_WINDOW_CAPACITY};
