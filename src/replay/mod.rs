//! Paced replay of a reading source.
//!
//! ```text
//!  operator ──start/stop/set_threshold──▶ Replayer
//!                                            │ spawns
//!                                            ▼
//!                                     drive() task ── sleep(interval) ──┐
//!                                            │                          │
//!                                            ▼                          │
//!                                  ReplayController::step() ◀───────────┘
//!                                   pull → window → evaluate → emit
//! ```

pub mod controller;
pub mod replayer;

pub use controller::{ReplayController, ReplayState, StopSignal, TickOutcome, DEFAULT_INTERVAL};
pub use replayer::{drive, ReplayStatus, Replayer};
