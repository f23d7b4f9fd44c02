//! Reading sources for the replay engine.
//!
//! A source is a finite, ordered sequence of sensor readings. The replay
//! controller pulls from it by index, one reading per tick.

mod file;
mod memory;
mod reading;

pub use file::{DataFormat, FileSource};
pub use memory::VecSource;
pub use reading::Reading;

use std::fmt::Debug;
use std::sync::Arc;

use crate::error::SourceError;

/// Trait for finite, ordered sequences of sensor readings.
///
/// # Example
///
/// ```
/// use motorwatch::{Reading, ReadingSource, VecSource};
///
/// let source = VecSource::new(vec![Reading::new("10", 30.0, 1.0, 1.0)]);
/// assert_eq!(source.len(), 1);
/// assert_eq!(source.reading(0).unwrap().temperature, 30.0);
/// ```
pub trait ReadingSource: Send + Sync + Debug {
    /// Total number of readings, including any malformed entries.
    fn len(&self) -> usize;

    /// Returns true when the source has no readings at all.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch the reading at `index`.
    ///
    /// Returns [`SourceError::Malformed`] if the entry could not be decoded
    /// and [`SourceError::OutOfRange`] past the end.
    fn reading(&self, index: usize) -> Result<Arc<Reading>, SourceError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}
