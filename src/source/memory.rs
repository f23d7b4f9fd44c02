//! In-memory reading source.

use std::sync::Arc;

use super::{Reading, ReadingSource};
use crate::error::SourceError;

/// A reading source backed by a vector already in memory.
#[derive(Debug, Clone)]
pub struct VecSource {
    readings: Vec<Arc<Reading>>,
    description: String,
}

impl VecSource {
    pub fn new(readings: Vec<Reading>) -> Self {
        Self::with_description(readings, "memory")
    }

    pub fn with_description(readings: Vec<Reading>, description: &str) -> Self {
        let description = format!("{}: {} readings", description, readings.len());
        Self {
            readings: readings.into_iter().map(Arc::new).collect(),
            description,
        }
    }
}

impl ReadingSource for VecSource {
    fn len(&self) -> usize {
        self.readings.len()
    }

    fn reading(&self, index: usize) -> Result<Arc<Reading>, SourceError> {
        let reading = self.readings.get(index).ok_or(SourceError::OutOfRange {
            index,
            len: self.readings.len(),
        })?;
        reading
            .validate()
            .map_err(|reason| SourceError::Malformed { index, reason })?;
        Ok(Arc::clone(reading))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_source_shares_readings() {
        let source = VecSource::new(vec![Reading::new("1", 40.0, 1.0, 1.0)]);
        let a = source.reading(0).unwrap();
        let b = source.reading(0).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(source.description(), "memory: 1 readings");
    }

    #[test]
    fn test_vec_source_out_of_range() {
        let source = VecSource::new(Vec::new());
        assert!(source.is_empty());
        assert!(matches!(
            source.reading(0),
            Err(SourceError::OutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_vec_source_rejects_non_finite() {
        let source = VecSource::new(vec![Reading::new("1", f64::INFINITY, 1.0, 1.0)]);
        assert!(matches!(
            source.reading(0),
            Err(SourceError::Malformed { index: 0, .. })
        ));
    }
}
