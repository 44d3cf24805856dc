//! Input adapter for emotion records
//!
//! Records arrive as NDJSON or a JSON array of loosely typed objects. Parsing
//! only checks JSON shape; conversion into `EmotionRecord` applies the
//! data-model validation (all seven emotions, values in [0, 1], session
//! reference length).

use crate::error::{ComputeError, ValidationError};
use crate::types::{EmotionRecord, EmotionVector};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Untyped record as received from a caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub timestamp: DateTime<Utc>,
    pub emotions: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_scores: Option<BTreeMap<String, f64>>,
    pub session_id: String,
}

impl RawRecord {
    /// Validate and convert into an `EmotionRecord`
    pub fn to_record(&self) -> Result<EmotionRecord, ValidationError> {
        let emotions = EmotionVector::from_map(self.emotions.clone())?;
        let record = EmotionRecord::new(self.timestamp, emotions, self.session_id.as_str())?;
        match &self.confidence_scores {
            Some(scores) => Ok(record.with_confidence_scores(EmotionVector::from_map(scores.clone())?)),
            None => Ok(record),
        }
    }
}

impl TryFrom<RawRecord> for EmotionRecord {
    type Error = ValidationError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        raw.to_record()
    }
}

/// A record rejected during batch validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordIssue {
    /// Position in the input batch
    pub index: usize,
    pub session_id: String,
    pub error: String,
}

/// Adapter for parsing and validating record batches
pub struct RecordAdapter;

impl RecordAdapter {
    /// Parse a JSON string containing an array of records
    pub fn parse_array(json: &str) -> Result<Vec<RawRecord>, ComputeError> {
        let records: Vec<RawRecord> = serde_json::from_str(json)?;
        Ok(records)
    }

    /// Parse NDJSON (newline-delimited JSON) records
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<RawRecord>, ComputeError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<RawRecord>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => {
                    return Err(ComputeError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(records)
    }

    /// Convert a batch, failing on the first invalid record
    pub fn to_records(raw: &[RawRecord]) -> Result<Vec<EmotionRecord>, ComputeError> {
        let mut records = Vec::with_capacity(raw.len());
        for (index, item) in raw.iter().enumerate() {
            let record = item.to_record().map_err(|e| {
                tracing::warn!(index, session_id = %item.session_id, error = %e, "rejected record");
                ComputeError::Validation(e)
            })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Report every invalid record without aborting
    pub fn validate_batch(raw: &[RawRecord]) -> Vec<RecordIssue> {
        raw.iter()
            .enumerate()
            .filter_map(|(index, item)| {
                item.to_record().err().map(|e| {
                    tracing::warn!(index, session_id = %item.session_id, error = %e, "invalid record");
                    RecordIssue {
                        index,
                        session_id: item.session_id.clone(),
                        error: e.to_string(),
                    }
                })
            })
            .collect()
    }

    /// Order records by timestamp ascending; equal timestamps keep input order
    pub fn sort_chronologically(records: &mut [EmotionRecord]) {
        records.sort_by_key(|r| r.timestamp);
    }

    /// Parse a JSON array, validate every record and sort chronologically
    pub fn records_from_json(json: &str) -> Result<Vec<EmotionRecord>, ComputeError> {
        let raw = Self::parse_array(json)?;
        let mut records = Self::to_records(&raw)?;
        Self::sort_chronologically(&mut records);
        Ok(records)
    }
}
