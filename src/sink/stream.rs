//! Stream-based display sink.
//!
//! Writes each snapshot as one line of JSON to any `Write` implementation.
//! Used by headless mode to pipe the replay into other tools.

use std::fmt;
use std::io::Write;

use super::{SnapshotSink, TickSnapshot};
use crate::error::SinkError;

/// A sink that writes newline-delimited JSON snapshots.
pub struct JsonLinesSink<W> {
    writer: W,
    description: String,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W, description: &str) -> Self {
        Self {
            writer,
            description: format!("stream: {}", description),
        }
    }

    /// Consume the sink and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLinesSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout(), "stdout")
    }
}

impl<W> fmt::Debug for JsonLinesSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonLinesSink")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<W: Write + Send> SnapshotSink for JsonLinesSink<W> {
    fn deliver(&mut self, snapshot: TickSnapshot) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, &snapshot)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}
