//! Mood trend classification
//!
//! Compares wellness over the most recent `trend_window` records with the
//! `trend_window` records immediately before them.

use crate::config::AnalyticsConfig;
use crate::scoring::StabilityWellnessScorer;
use crate::types::{EmotionVector, Trend};

/// Labels a history as improving, declining or stable
pub struct TrendClassifier {
    config: AnalyticsConfig,
    scorer: StabilityWellnessScorer,
}

impl Default for TrendClassifier {
    fn default() -> Self {
        Self::new(AnalyticsConfig::default())
    }
}

impl TrendClassifier {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self {
            config,
            scorer: StabilityWellnessScorer::new(config),
        }
    }

    /// Classify the trend of `history` (oldest first).
    ///
    /// Histories shorter than `trend_min_records` are always stable. The
    /// earlier window may be shorter than `trend_window` when history is short.
    pub fn classify<T: AsRef<EmotionVector>>(&self, history: &[T]) -> Trend {
        if history.len() < self.config.trend_min_records {
            return Trend::Stable;
        }

        let window = self.config.trend_window;
        let split = history.len().saturating_sub(window);
        let recent = &history[split..];
        let earlier = &history[split.saturating_sub(window)..split];

        let recent_wellness = self.scorer.wellness(recent);
        let earlier_wellness = self.scorer.wellness(earlier);
        let delta = recent_wellness - earlier_wellness;

        let trend = if delta > self.config.trend_delta {
            Trend::Improving
        } else if delta < -self.config.trend_delta {
            Trend::Declining
        } else {
            Trend::Stable
        };

        tracing::debug!(
            recent_wellness,
            earlier_wellness,
            trend = trend.as_str(),
            "classified mood trend"
        );

        trend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Emotion;

    fn vector(emotion: Emotion, value: f64) -> EmotionVector {
        EmotionVector::zero().with(emotion, value).unwrap()
    }

    #[test]
    fn test_four_records_always_stable() {
        let classifier = TrendClassifier::default();
        let history = vec![
            vector(Emotion::Angry, 1.0),
            vector(Emotion::Angry, 1.0),
            vector(Emotion::Happy, 1.0),
            vector(Emotion::Happy, 1.0),
        ];
        assert_eq!(classifier.classify(&history), Trend::Stable);
    }

    #[test]
    fn test_improving() {
        let classifier = TrendClassifier::default();
        let mut history = vec![vector(Emotion::Sad, 0.8); 3];
        history.extend(vec![vector(Emotion::Happy, 0.8); 3]);
        assert_eq!(classifier.classify(&history), Trend::Improving);
    }

    #[test]
    fn test_declining() {
        let classifier = TrendClassifier::default();
        let mut history = vec![vector(Emotion::Happy, 0.8); 3];
        history.extend(vec![vector(Emotion::Fearful, 0.8); 3]);
        assert_eq!(classifier.classify(&history), Trend::Declining);
    }

    #[test]
    fn test_small_change_is_stable() {
        let classifier = TrendClassifier::default();
        // wellness of a neutral-only record is 0.5; of happy 0.1 + neutral 0.9 is 0.55
        let mut history = vec![vector(Emotion::Neutral, 0.9); 3];
        let mild = vector(Emotion::Neutral, 0.9).with(Emotion::Happy, 0.1).unwrap();
        history.extend(vec![mild; 3]);
        assert_eq!(classifier.classify(&history), Trend::Stable);
    }

    #[test]
    fn test_five_records_use_shorter_earlier_window() {
        let classifier = TrendClassifier::default();
        // earlier window = first two records, recent = last three
        let history = vec![
            vector(Emotion::Angry, 1.0),
            vector(Emotion::Angry, 1.0),
            vector(Emotion::Happy, 1.0),
            vector(Emotion::Happy, 1.0),
            vector(Emotion::Happy, 1.0),
        ];
        assert_eq!(classifier.classify(&history), Trend::Improving);
    }

    #[test]
    fn test_only_last_six_matter() {
        let classifier = TrendClassifier::default();
        let mut history = vec![vector(Emotion::Angry, 1.0); 10];
        history.extend(vec![vector(Emotion::Happy, 1.0); 6]);
        assert_eq!(classifier.classify(&history), Trend::Stable);
    }
}
