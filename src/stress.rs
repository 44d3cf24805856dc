//! Stress classification and emotion distribution
//!
//! Each record is bucketed by its dominant emotion into exactly one of three
//! disjoint sets: positive (low), stressful (high) and everything else
//! (medium). This module also derives the share of total emotional content
//! per emotion and a weighted per-record stress score.

use crate::types::{
    Emotion, EmotionRecord, HourlyStress, StressBucket, StressCategory, StressLevels,
    StressProfile, StressSample, EMOTION_COUNT,
};
use chrono::Timelike;
use std::collections::{BTreeMap, HashMap};

/// Percentage reported for every bucket when there are no records
pub const DEGENERATE_STRESS_SHARE: f64 = 33.3;

/// Hours whose mean stress exceeds the overall mean by this factor are peaks
const PEAK_STRESS_FACTOR: f64 = 1.2;

/// Maximum peak stress hours reported
const PEAK_STRESS_HOURS: usize = 5;

/// Classifies records into stress buckets and summarizes emotional content
pub struct StressClassifier;

impl StressClassifier {
    /// Stress bucket of a dominant emotion
    pub fn bucket_for(emotion: Emotion) -> StressBucket {
        match emotion {
            Emotion::Angry | Emotion::Fearful | Emotion::Disgusted | Emotion::Sad => {
                StressBucket::High
            }
            Emotion::Happy => StressBucket::Low,
            Emotion::Surprised | Emotion::Neutral => StressBucket::Medium,
        }
    }

    /// Bucket of a single record by its dominant emotion.
    ///
    /// An all-zero vector resolves to happy under the canonical tie-break, so a
    /// record with no signal counts as low stress.
    pub fn classify(record: &EmotionRecord) -> StressBucket {
        Self::bucket_for(record.emotions.dominant().0)
    }

    /// Share of records per bucket, in percent.
    ///
    /// With no records every bucket reports 33.3.
    pub fn stress_levels(records: &[EmotionRecord]) -> StressLevels {
        if records.is_empty() {
            return StressLevels {
                low: DEGENERATE_STRESS_SHARE,
                medium: DEGENERATE_STRESS_SHARE,
                high: DEGENERATE_STRESS_SHARE,
            };
        }

        let (mut low, mut medium, mut high) = (0usize, 0usize, 0usize);
        for record in records {
            match Self::classify(record) {
                StressBucket::Low => low += 1,
                StressBucket::Medium => medium += 1,
                StressBucket::High => high += 1,
            }
        }

        let total = records.len() as f64;
        StressLevels {
            low: low as f64 / total * 100.0,
            medium: medium as f64 / total * 100.0,
            high: high as f64 / total * 100.0,
        }
    }

    /// Each emotion's share of the summed emotional content, in percent.
    ///
    /// Empty when the grand total is zero.
    pub fn emotion_distribution(records: &[EmotionRecord]) -> BTreeMap<Emotion, f64> {
        let mut sums = [0.0; EMOTION_COUNT];
        for record in records {
            for (sum, value) in sums.iter_mut().zip(record.emotions.values()) {
                *sum += value;
            }
        }

        let grand_total: f64 = sums.iter().sum();
        if grand_total <= 0.0 {
            return BTreeMap::new();
        }

        Emotion::ALL
            .into_iter()
            .map(|e| (e, sums[e as usize] / grand_total * 100.0))
            .collect()
    }

    /// Number of records per dominant emotion; absent emotions are omitted
    pub fn dominant_distribution(records: &[EmotionRecord]) -> BTreeMap<Emotion, usize> {
        let mut counts = BTreeMap::new();
        for record in records {
            *counts.entry(record.emotions.dominant().0).or_insert(0) += 1;
        }
        counts
    }

    /// Weighted stress score of a single record, clamped to 0-1
    pub fn stress_score(record: &EmotionRecord) -> f64 {
        let e = &record.emotions;
        (e.get(Emotion::Angry) * 0.3
            + e.get(Emotion::Fearful) * 0.3
            + e.get(Emotion::Disgusted) * 0.2
            + e.get(Emotion::Sad) * 0.2
            - e.get(Emotion::Happy) * 0.1)
            .clamp(0.0, 1.0)
    }

    /// Stress timeline with overall metrics and the most stressful hours
    pub fn stress_profile(records: &[EmotionRecord]) -> StressProfile {
        let timeline: Vec<StressSample> = records
            .iter()
            .map(|record| StressSample {
                timestamp: record.timestamp,
                stress_level: Self::stress_score(record),
                dominant_emotion: record.emotions.dominant().0,
            })
            .collect();

        if timeline.is_empty() {
            return StressProfile {
                average_stress: 0.0,
                max_stress: 0.0,
                stress_category: StressCategory::Low,
                timeline,
                peak_stress_hours: Vec::new(),
            };
        }

        let average_stress =
            timeline.iter().map(|s| s.stress_level).sum::<f64>() / timeline.len() as f64;
        let max_stress = timeline.iter().map(|s| s.stress_level).fold(0.0, f64::max);

        let mut by_hour: HashMap<u32, (f64, usize)> = HashMap::new();
        for sample in &timeline {
            let entry = by_hour.entry(sample.timestamp.hour()).or_insert((0.0, 0));
            entry.0 += sample.stress_level;
            entry.1 += 1;
        }

        let mut peak_stress_hours: Vec<HourlyStress> = by_hour
            .into_iter()
            .map(|(hour, (sum, count))| HourlyStress {
                hour,
                avg_stress: sum / count as f64,
            })
            .filter(|h| h.avg_stress > average_stress * PEAK_STRESS_FACTOR)
            .collect();
        peak_stress_hours.sort_by(|a, b| {
            b.avg_stress
                .total_cmp(&a.avg_stress)
                .then_with(|| a.hour.cmp(&b.hour))
        });
        peak_stress_hours.truncate(PEAK_STRESS_HOURS);

        StressProfile {
            average_stress,
            max_stress,
            stress_category: Self::category_for(average_stress),
            timeline,
            peak_stress_hours,
        }
    }

    fn category_for(average_stress: f64) -> StressCategory {
        if average_stress < 0.3 {
            StressCategory::Low
        } else if average_stress < 0.6 {
            StressCategory::Moderate
        } else {
            StressCategory::High
        }
    }
}
