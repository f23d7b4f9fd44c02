//! File-based reading source.
//!
//! Loads a complete recording from a CSV or JSON file up front. Rows that
//! fail to decode are kept in place as malformed entries so that replay
//! halts exactly when the cursor reaches them.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use csv::StringRecord;
use serde_json::Value;

use super::{Reading, ReadingSource};
use crate::error::SourceError;

/// Supported on-disk formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// Header row with `timestamp,temperature,vibration_x,vibration_z`.
    Csv,
    /// A JSON array of reading objects.
    Json,
}

impl DataFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(DataFormat::Csv),
            "json" => Ok(DataFormat::Json),
            _ => Err(SourceError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

type Slot = Result<Arc<Reading>, String>;

/// Column positions of the required fields in a CSV header.
struct Columns {
    timestamp: usize,
    temperature: usize,
    vibration_x: usize,
    vibration_z: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, SourceError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or(SourceError::MissingColumn(name))
        };
        Ok(Self {
            timestamp: find("timestamp")?,
            temperature: find("temperature")?,
            vibration_x: find("vibration_x")?,
            vibration_z: find("vibration_z")?,
        })
    }

    fn decode(&self, record: &StringRecord) -> Result<Reading, String> {
        let reading = Reading {
            timestamp: text_field(record, self.timestamp, "timestamp")?.to_string(),
            temperature: numeric_field(record, self.temperature, "temperature")?,
            vibration_x: numeric_field(record, self.vibration_x, "vibration_x")?,
            vibration_z: numeric_field(record, self.vibration_z, "vibration_z")?,
        };
        reading.validate()?;
        Ok(reading)
    }
}

fn text_field<'r>(record: &'r StringRecord, idx: usize, name: &str) -> Result<&'r str, String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("field `{}` is missing", name))
}

fn numeric_field(record: &StringRecord, idx: usize, name: &str) -> Result<f64, String> {
    let raw = text_field(record, idx, name)?;
    raw.parse::<f64>()
        .map_err(|_| format!("field `{}` is not numeric: {:?}", name, raw))
}

fn decode_json_entry(entry: &Value) -> Result<Reading, String> {
    let obj = entry
        .as_object()
        .ok_or_else(|| "entry is not an object".to_string())?;

    let timestamp = match obj.get("timestamp") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err("field `timestamp` is missing".to_string()),
    };

    let numeric = |name: &str| -> Result<f64, String> {
        match obj.get(name) {
            None | Some(Value::Null) => Err(format!("field `{}` is missing", name)),
            Some(Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| format!("field `{}` is not numeric: {}", name, n)),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("field `{}` is not numeric: {:?}", name, s)),
            Some(other) => Err(format!("field `{}` is not numeric: {}", name, other)),
        }
    };

    let reading = Reading {
        timestamp,
        temperature: numeric("temperature")?,
        vibration_x: numeric("vibration_x")?,
        vibration_z: numeric("vibration_z")?,
    };
    reading.validate()?;
    Ok(reading)
}

/// A reading source loaded from a CSV or JSON file.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    format: DataFormat,
    description: String,
    slots: Vec<Slot>,
}

impl FileSource {
    /// Load a file, picking the format from its extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let format = DataFormat::from_path(path)?;
        Self::load_with_format(path, format)
    }

    /// Load a file in an explicit format.
    pub fn load_with_format<P: AsRef<Path>>(
        path: P,
        format: DataFormat,
    ) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let io_err = |source| SourceError::Io {
            path: path.clone(),
            source,
        };

        let slots = match format {
            DataFormat::Csv => Self::parse_csv(fs::File::open(&path).map_err(io_err)?)?,
            DataFormat::Json => Self::parse_json(&fs::read_to_string(&path).map_err(io_err)?)?,
        };

        let description = format!("file: {}", path.display());
        Ok(Self {
            path,
            format,
            description,
            slots,
        })
    }

    /// Build a source from CSV text held in any reader.
    pub fn from_csv_reader<R: Read>(reader: R, description: &str) -> Result<Self, SourceError> {
        Ok(Self {
            path: PathBuf::new(),
            format: DataFormat::Csv,
            description: description.to_string(),
            slots: Self::parse_csv(reader)?,
        })
    }

    /// Build a source from a JSON array held in memory.
    pub fn from_json_str(content: &str, description: &str) -> Result<Self, SourceError> {
        Ok(Self {
            path: PathBuf::new(),
            format: DataFormat::Json,
            description: description.to_string(),
            slots: Self::parse_json(content)?,
        })
    }

    fn parse_csv<R: Read>(reader: R) -> Result<Vec<Slot>, SourceError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let columns = Columns::locate(rdr.headers()?)?;

        Ok(rdr
            .records()
            .map(|record| {
                record
                    .map_err(|e| e.to_string())
                    .and_then(|r| columns.decode(&r))
                    .map(Arc::new)
            })
            .collect())
    }

    fn parse_json(content: &str) -> Result<Vec<Slot>, SourceError> {
        let entries: Vec<Value> = serde_json::from_str(content)?;
        Ok(entries
            .iter()
            .map(|entry| decode_json_entry(entry).map(Arc::new))
            .collect())
    }

    /// Returns the path this source was loaded from (empty for in-memory text).
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> DataFormat {
        self.format
    }

    /// Number of entries that failed to decode.
    pub fn malformed_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_err()).count()
    }

    /// The first malformed entry, if any, as `(index, reason)`.
    pub fn first_malformed(&self) -> Option<(usize, &str)> {
        self.slots
            .iter()
            .enumerate()
            .find_map(|(i, s)| s.as_ref().err().map(|reason| (i, reason.as_str())))
    }
}

impl ReadingSource for FileSource {
    fn len(&self) -> usize {
        self.slots.len()
    }

    fn reading(&self, index: usize) -> Result<Arc<Reading>, SourceError> {
        match self.slots.get(index) {
            Some(Ok(reading)) => Ok(Arc::clone(reading)),
            Some(Err(reason)) => Err(SourceError::Malformed {
                index,
                reason: reason.clone(),
            }),
            None => Err(SourceError::OutOfRange {
                index,
                len: self.slots.len(),
            }),
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}
