//! Baseline computation
//!
//! This module computes per-emotion mean confidences over a record set.
//! Baselines are the "normal" reference that peak detection compares against.

use crate::types::{Baseline, Emotion, EmotionRecord, EMOTION_COUNT};
use std::collections::BTreeMap;

/// Computes baselines over flat record sequences
pub struct BaselineTracker;

impl BaselineTracker {
    /// Mean confidence per emotion observed in `records`.
    ///
    /// An empty input yields an empty baseline.
    pub fn compute(records: &[EmotionRecord]) -> Baseline {
        if records.is_empty() {
            return Baseline::default();
        }

        let mut sums = [0.0; EMOTION_COUNT];
        for record in records {
            for (sum, value) in sums.iter_mut().zip(record.emotions.values()) {
                *sum += value;
            }
        }

        let count = records.len() as f64;
        let means: BTreeMap<_, _> = Emotion::ALL
            .into_iter()
            .map(|emotion| (emotion, sums[emotion as usize] / count))
            .collect();

        tracing::debug!(records = records.len(), "computed emotion baselines");

        Baseline {
            means,
            record_count: records.len(),
        }
    }
}
