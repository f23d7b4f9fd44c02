//! Error types for the replay engine.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or reading sensor data.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The data file could not be opened or read.
    #[error("Read error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader failed below the record level.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The JSON document is not valid JSON or not an array.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required column is absent from the header row.
    #[error("Missing required column `{0}`")]
    MissingColumn(&'static str),

    /// The file extension does not map to a known format.
    #[error("Unsupported data format: {0}")]
    UnsupportedFormat(String),

    /// The record at `index` could not be decoded into a reading.
    #[error("Malformed reading at index {index}: {reason}")]
    Malformed { index: usize, reason: String },

    /// The requested index is past the end of the source.
    #[error("Index {index} out of range (source has {len} readings)")]
    OutOfRange { index: usize, len: usize },
}

/// Fatal errors that halt a replay session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplayError {
    /// The reading at the cursor is missing or malformed.
    #[error("Malformed reading at index {index}: {reason}")]
    MalformedReading { index: usize, reason: String },

    /// The driver task ended without finishing the session (it panicked or
    /// was cancelled).
    #[error("Replay task ended abnormally: {0}")]
    DriverAborted(String),
}

impl ReplayError {
    /// Convert a source failure at `index` into a session error.
    pub fn from_source(index: usize, err: SourceError) -> Self {
        let reason = match err {
            SourceError::Malformed { reason, .. } => reason,
            other => other.to_string(),
        };
        ReplayError::MalformedReading { index, reason }
    }

    /// Index of the offending reading, if a reading caused the failure.
    pub fn index(&self) -> Option<usize> {
        match self {
            ReplayError::MalformedReading { index, .. } => Some(*index),
            ReplayError::DriverAborted(_) => None,
        }
    }
}

/// Failure to hand a snapshot to the display.
///
/// Never fatal: the controller logs it and keeps ticking.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The consumer side of the sink has gone away.
    #[error("Display sink unavailable: {0}")]
    Unavailable(String),

    /// Writing the serialized snapshot failed.
    #[error("Write failed: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot could not be serialized.
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
