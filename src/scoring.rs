//! Wellness, stability and dominant-emotion scoring
//!
//! Closed-form scores over the most recent part of a history:
//! - wellness: valence-weighted content, normalized to 0-1
//! - stability: inverse of per-emotion variance
//! - dominant emotion: recency-weighted mean, newest records weigh most
//!
//! Histories are ordered oldest first. Each scorer accepts anything that
//! exposes an `EmotionVector`, so records and bare vectors both work.

use crate::config::AnalyticsConfig;
use crate::types::{Emotion, EmotionVector, ScoreResult, EMOTION_COUNT};

/// Wellness reported when no record yields a usable sample
pub const DEFAULT_WELLNESS: f64 = 0.5;

/// Stability reported for histories too short to measure
pub const DEFAULT_STABILITY: f64 = 0.7;

/// Scorer for wellness, stability and the dominant-emotion trend
#[derive(Debug, Clone, Copy)]
pub struct StabilityWellnessScorer {
    config: AnalyticsConfig,
}

impl Default for StabilityWellnessScorer {
    fn default() -> Self {
        Self::new(AnalyticsConfig::default())
    }
}

impl StabilityWellnessScorer {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    /// Compute all scores for a history
    pub fn score<T: AsRef<EmotionVector>>(&self, history: &[T]) -> ScoreResult {
        let (dominant_emotion, confidence) = self.dominant_trend(history);
        let result = ScoreResult {
            wellness: self.wellness(history),
            stability: self.stability(history),
            dominant_emotion,
            confidence,
        };

        tracing::debug!(
            records = history.len(),
            wellness = result.wellness,
            stability = result.stability,
            dominant = %result.dominant_emotion,
            confidence = result.confidence,
            "scored history"
        );

        result
    }

    /// Mean normalized valence over the most recent `wellness_window` records.
    ///
    /// Per record: `(Σ value×weight + Σ value) / (2 × Σ value)`, clamped to
    /// 0-1. Records with zero total intensity contribute no sample.
    pub fn wellness<T: AsRef<EmotionVector>>(&self, history: &[T]) -> f64 {
        let samples: Vec<f64> = recent(history, self.config.wellness_window)
            .iter()
            .filter_map(|record| self.wellness_sample(record.as_ref()))
            .collect();

        if samples.is_empty() {
            return DEFAULT_WELLNESS;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    fn wellness_sample(&self, vector: &EmotionVector) -> Option<f64> {
        let mut weighted_sum = 0.0;
        let mut total_intensity = 0.0;
        for (emotion, value) in vector.iter() {
            weighted_sum += value * self.config.weights.weight(emotion);
            total_intensity += value;
        }

        if total_intensity > 0.0 {
            Some(((weighted_sum + total_intensity) / (2.0 * total_intensity)).clamp(0.0, 1.0))
        } else {
            None
        }
    }

    /// Inverse of the mean per-emotion variance over the most recent
    /// `stability_window` records
    pub fn stability<T: AsRef<EmotionVector>>(&self, history: &[T]) -> f64 {
        if history.len() < self.config.stability_min_records {
            return DEFAULT_STABILITY;
        }

        let window = recent(history, self.config.stability_window);
        if window.is_empty() {
            return DEFAULT_STABILITY;
        }

        let n = window.len() as f64;
        let mut variance_sum = 0.0;
        for index in 0..EMOTION_COUNT {
            let mean = window
                .iter()
                .map(|r| r.as_ref().values()[index])
                .sum::<f64>()
                / n;
            variance_sum += window
                .iter()
                .map(|r| (r.as_ref().values()[index] - mean).powi(2))
                .sum::<f64>()
                / n;
        }
        let avg_variance = variance_sum / EMOTION_COUNT as f64;

        (1.0 - avg_variance / self.config.stability_normalizer)
            .max(self.config.stability_floor)
            .clamp(0.0, 1.0)
    }

    /// Recency-weighted dominant emotion and its confidence.
    ///
    /// Within the last `dominant_lookback` records, record `i` (oldest = 0)
    /// weighs `(i + 1) / N`. Ties resolve to the earliest canonical label.
    pub fn dominant_trend<T: AsRef<EmotionVector>>(&self, history: &[T]) -> (Emotion, f64) {
        let window = recent(history, self.config.dominant_lookback);
        if window.is_empty() {
            return (Emotion::Neutral, 0.0);
        }

        let n = window.len() as f64;
        let mut totals = [0.0; EMOTION_COUNT];
        let mut total_weight = 0.0;
        for (i, record) in window.iter().enumerate() {
            let weight = (i + 1) as f64 / n;
            for (total, value) in totals.iter_mut().zip(record.as_ref().values()) {
                *total += value * weight;
            }
            total_weight += weight;
        }

        let mut best = (Emotion::ALL[0], totals[0] / total_weight);
        for emotion in Emotion::ALL.into_iter().skip(1) {
            let value = totals[emotion as usize] / total_weight;
            if value > best.1 {
                best = (emotion, value);
            }
        }

        (best.0, best.1.min(1.0))
    }
}

/// The last `n` entries of `history` (all of it when shorter)
pub(crate) fn recent<T>(history: &[T], n: usize) -> &[T] {
    &history[history.len().saturating_sub(n)..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmotionWeights;

    fn vector(pairs: &[(Emotion, f64)]) -> EmotionVector {
        pairs
            .iter()
            .fold(EmotionVector::zero(), |v, (e, x)| v.with(*e, *x).unwrap())
    }

    #[test]
    fn test_wellness_single_happy() {
        let scorer = StabilityWellnessScorer::default();
        let wellness = scorer.wellness(&[vector(&[(Emotion::Happy, 1.0)])]);
        assert!((wellness - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_wellness_single_angry() {
        let scorer = StabilityWellnessScorer::default();
        let wellness = scorer.wellness(&[vector(&[(Emotion::Angry, 1.0)])]);
        assert!(wellness.abs() < 1e-9);
    }

    #[test]
    fn test_wellness_mixed_record() {
        let scorer = StabilityWellnessScorer::default();
        // weighted = 0.6 - 0.8*0.4 = 0.28, total = 1.0 → (0.28 + 1.0) / 2 = 0.64
        let wellness = scorer.wellness(&[vector(&[(Emotion::Happy, 0.6), (Emotion::Sad, 0.4)])]);
        assert!((wellness - 0.64).abs() < 1e-9);
    }

    #[test]
    fn test_wellness_defaults() {
        let scorer = StabilityWellnessScorer::default();
        let empty: [EmotionVector; 0] = [];
        assert_eq!(scorer.wellness(&empty), DEFAULT_WELLNESS);
        // zero-intensity records give no sample
        assert_eq!(scorer.wellness(&[EmotionVector::zero()]), DEFAULT_WELLNESS);
    }

    #[test]
    fn test_wellness_uses_last_ten() {
        let scorer = StabilityWellnessScorer::default();
        let mut history = vec![vector(&[(Emotion::Angry, 1.0)]); 5];
        history.extend(vec![vector(&[(Emotion::Happy, 1.0)]); 10]);
        assert!((scorer.wellness(&history) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_wellness_with_custom_weights() {
        let config = AnalyticsConfig {
            weights: EmotionWeights {
                neutral: 1.0,
                ..EmotionWeights::default()
            },
            ..AnalyticsConfig::default()
        };
        let scorer = StabilityWellnessScorer::new(config);
        let wellness = scorer.wellness(&[vector(&[(Emotion::Neutral, 0.5)])]);
        assert!((wellness - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_stability_short_history() {
        let scorer = StabilityWellnessScorer::default();
        let history = vec![vector(&[(Emotion::Happy, 1.0)]); 2];
        assert_eq!(scorer.stability(&history), DEFAULT_STABILITY);
    }

    #[test]
    fn test_stability_constant_history() {
        let scorer = StabilityWellnessScorer::default();
        let history = vec![vector(&[(Emotion::Happy, 0.7), (Emotion::Neutral, 0.3)]); 6];
        assert!((scorer.stability(&history) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_stability_fluctuating_history() {
        let scorer = StabilityWellnessScorer::default();
        let happy = vector(&[(Emotion::Happy, 1.0)]);
        let angry = vector(&[(Emotion::Angry, 1.0)]);
        let history = vec![happy.clone(), angry.clone(), happy.clone(), angry, happy];

        // happy: mean 0.6, var 0.24; angry: mean 0.4, var 0.24; others 0
        // avg variance = 0.48 / 7; stability = 1 - (0.48 / 7) / 0.3
        let expected = 1.0 - (0.48 / 7.0) / 0.3;
        assert!((scorer.stability(&history) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_stability_floor() {
        let config = AnalyticsConfig {
            stability_normalizer: 0.01,
            ..AnalyticsConfig::default()
        };
        let scorer = StabilityWellnessScorer::new(config);
        let happy = vector(&[(Emotion::Happy, 1.0)]);
        let sad = vector(&[(Emotion::Sad, 1.0)]);
        let history = vec![happy.clone(), sad.clone(), happy, sad];
        assert!((scorer.stability(&history) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_dominant_trend_recency_weighting() {
        let scorer = StabilityWellnessScorer::default();
        let history = vec![
            vector(&[(Emotion::Sad, 0.9)]),
            vector(&[(Emotion::Sad, 0.9)]),
            vector(&[(Emotion::Happy, 0.8)]),
            vector(&[(Emotion::Happy, 0.8)]),
        ];
        // weights 0.25, 0.5, 0.75, 1.0 (total 2.5)
        // sad = 0.9 * 0.75 / 2.5 = 0.27; happy = 0.8 * 1.75 / 2.5 = 0.56
        let (dominant, confidence) = scorer.dominant_trend(&history);
        assert_eq!(dominant, Emotion::Happy);
        assert!((confidence - 0.56).abs() < 1e-9);
    }

    #[test]
    fn test_dominant_trend_tie_uses_canonical_order() {
        let scorer = StabilityWellnessScorer::default();
        let history = vec![vector(&[(Emotion::Neutral, 0.5), (Emotion::Fearful, 0.5)])];
        assert_eq!(scorer.dominant_trend(&history).0, Emotion::Fearful);
    }

    #[test]
    fn test_empty_history_defaults() {
        let scorer = StabilityWellnessScorer::default();
        let empty: [EmotionVector; 0] = [];
        let result = scorer.score(&empty);
        assert_eq!(result.wellness, 0.5);
        assert_eq!(result.stability, 0.7);
        assert_eq!(result.dominant_emotion, Emotion::Neutral);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_score_is_idempotent() {
        let scorer = StabilityWellnessScorer::default();
        let history = vec![
            vector(&[(Emotion::Happy, 0.3), (Emotion::Surprised, 0.6)]),
            vector(&[(Emotion::Fearful, 0.7)]),
            vector(&[(Emotion::Neutral, 0.9)]),
        ];
        let first = scorer.score(&history);
        let second = scorer.score(&history);
        assert_eq!(first.wellness.to_bits(), second.wellness.to_bits());
        assert_eq!(first.stability.to_bits(), second.stability.to_bits());
        assert_eq!(first.confidence.to_bits(), second.confidence.to_bits());
    }
}
