//! Pipeline orchestration
//!
//! This module provides the public API for Emotion Insights. It runs every
//! analysis stage over one user's ordered record set and bundles the results.
//!
//! Stages:
//! 1. RecordAdapter - parse, validate and order records (JSON entry points only)
//! 2. WindowAggregator - summary, hourly/weekday/daily buckets, daily stats
//! 3. PeakAnomalyDetector - baseline-relative peaks and absolute anomalies
//! 4. StressClassifier - stress split, distributions, stress profile
//! 5. StabilityWellnessScorer + TrendClassifier - mood prediction
//! 6. RecommendationEngine - recommendations and insights
//! 7. ReportEncoder - rounded JSON payload

use crate::adapter::RecordAdapter;
use crate::config::AnalyticsConfig;
use crate::encoder::ReportEncoder;
use crate::error::ComputeError;
use crate::peaks::PeakAnomalyDetector;
use crate::recommend::RecommendationEngine;
use crate::scoring::{StabilityWellnessScorer, DEFAULT_STABILITY, DEFAULT_WELLNESS};
use crate::stress::StressClassifier;
use crate::trend::TrendClassifier;
use crate::types::{
    AnalysisReport, CurrentRecommendations, Emotion, EmotionRecord, EmotionVector, MoodPrediction,
    MoodReport, ScoreResult, Trend,
};
use crate::window::WindowAggregator;
use chrono::NaiveDate;
use std::iter;

/// Analyze a JSON array of records over an inclusive date range.
///
/// # Returns
/// The rounded `AnalysisReport` payload as JSON
///
/// # Example
/// ```ignore
/// let report = analyze_json(records_json, start, end)?;
/// ```
pub fn analyze_json(
    records_json: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<String, ComputeError> {
    EmotionAnalyzer::default().analyze_json(records_json, start, end)
}

/// Predict mood from a JSON array of records.
///
/// # Returns
/// The rounded `MoodReport` payload as JSON
pub fn predict_mood_json(records_json: &str) -> Result<String, ComputeError> {
    EmotionAnalyzer::default().predict_mood_json(records_json)
}

/// Recommend for a current emotion map given a JSON array of history records.
///
/// # Returns
/// The rounded `CurrentRecommendations` payload as JSON
pub fn recommend_json(current_json: &str, history_json: &str) -> Result<String, ComputeError> {
    EmotionAnalyzer::default().recommend_json(current_json, history_json)
}

/// Runs every analysis stage with one immutable configuration.
///
/// Holds no per-call state; one analyzer may serve any number of users.
pub struct EmotionAnalyzer {
    config: AnalyticsConfig,
    scorer: StabilityWellnessScorer,
    trend: TrendClassifier,
    detector: PeakAnomalyDetector,
    recommender: RecommendationEngine,
}

impl Default for EmotionAnalyzer {
    fn default() -> Self {
        Self::new(AnalyticsConfig::default())
    }
}

impl EmotionAnalyzer {
    /// Create an analyzer with the given configuration
    pub fn new(config: AnalyticsConfig) -> Self {
        Self {
            config,
            scorer: StabilityWellnessScorer::new(config),
            trend: TrendClassifier::new(config),
            detector: PeakAnomalyDetector::new(config),
            recommender: RecommendationEngine::new(config),
        }
    }

    /// Create an analyzer from a JSON configuration
    pub fn from_config_json(json: &str) -> Result<Self, ComputeError> {
        Ok(Self::new(AnalyticsConfig::from_json(json)?))
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// JSON in, rounded payload out; see [`EmotionAnalyzer::analyze`]
    pub fn analyze_json(
        &self,
        records_json: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<String, ComputeError> {
        let records = RecordAdapter::records_from_json(records_json)?;
        let report = self.analyze(&records, start, end)?;
        ReportEncoder::new().encode_to_json(&report)
    }

    /// JSON in, rounded payload out; see [`EmotionAnalyzer::predict_mood`]
    pub fn predict_mood_json(&self, records_json: &str) -> Result<String, ComputeError> {
        let records = RecordAdapter::records_from_json(records_json)?;
        ReportEncoder::new().encode_to_json(&self.predict_mood(&records))
    }

    /// JSON in, rounded payload out; see [`EmotionAnalyzer::recommend_for_current`]
    pub fn recommend_json(
        &self,
        current_json: &str,
        history_json: &str,
    ) -> Result<String, ComputeError> {
        let current: EmotionVector = serde_json::from_str(current_json)?;
        let history = RecordAdapter::records_from_json(history_json)?;
        ReportEncoder::new().encode_to_json(&self.recommend_for_current(&current, &history))
    }

    /// Mood prediction, recommendations and insights for a history.
    ///
    /// An empty history yields the default scores with a single onboarding
    /// recommendation.
    pub fn predict_mood(&self, records: &[EmotionRecord]) -> MoodReport {
        if records.is_empty() {
            tracing::debug!("no history, returning onboarding prediction");
            return MoodReport {
                prediction: MoodPrediction {
                    dominant_emotion: Emotion::Neutral,
                    confidence: 0.0,
                    trend: Trend::Stable,
                    wellness_score: DEFAULT_WELLNESS,
                    stability_score: DEFAULT_STABILITY,
                    data_points: 0,
                },
                recommendations: RecommendationEngine::getting_started(),
                insights: vec![RecommendationEngine::getting_started_insight()],
            };
        }

        let scores = self.scorer.score(records);
        let prediction = MoodPrediction {
            dominant_emotion: scores.dominant_emotion,
            confidence: scores.confidence,
            trend: self.trend.classify(records),
            wellness_score: scores.wellness,
            stability_score: scores.stability,
            data_points: records.len(),
        };

        let recommendations = self.recommender.recommend(
            prediction.dominant_emotion,
            prediction.confidence,
            prediction.wellness_score,
            prediction.stability_score,
        );
        let insights = self.recommender.insights(&prediction);

        MoodReport {
            prediction,
            recommendations,
            insights,
        }
    }

    /// Recommendations for a current emotion state in the context of history.
    ///
    /// The current vector's strongest emotion and its value drive the base
    /// rules. Wellness and stability cover history plus the current vector,
    /// or take their defaults when there is no history.
    pub fn recommend_for_current(
        &self,
        current: &EmotionVector,
        history: &[EmotionRecord],
    ) -> CurrentRecommendations {
        let (dominant_emotion, confidence) = current.dominant();

        let (wellness, stability) = if history.is_empty() {
            (DEFAULT_WELLNESS, DEFAULT_STABILITY)
        } else {
            let combined: Vec<&EmotionVector> = history
                .iter()
                .map(|r| &r.emotions)
                .chain(iter::once(current))
                .collect();
            (self.scorer.wellness(&combined), self.scorer.stability(&combined))
        };

        let recommendations =
            self.recommender
                .recommend(dominant_emotion, confidence, wellness, stability);

        CurrentRecommendations {
            recommendations,
            context: ScoreResult {
                wellness,
                stability,
                dominant_emotion,
                confidence,
            },
        }
    }

    /// Full analysis of one user's records over an inclusive date range.
    ///
    /// Records must be ordered by timestamp ascending. Only the date range
    /// can fail; every stage is total over valid records.
    pub fn analyze(
        &self,
        records: &[EmotionRecord],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AnalysisReport, ComputeError> {
        let daily_trends = WindowAggregator::by_date(records, start, end)?;
        let daily_stats = WindowAggregator::daily_stats(records, start, end)?;

        let report = AnalysisReport {
            summary: WindowAggregator::summarize(records),
            hourly_patterns: WindowAggregator::by_hour(records),
            weekday_patterns: WindowAggregator::by_weekday(records),
            daily_trends,
            daily_stats,
            peaks: self.detector.detect(records),
            stress_levels: StressClassifier::stress_levels(records),
            emotion_correlations: StressClassifier::emotion_distribution(records),
            dominant_distribution: StressClassifier::dominant_distribution(records),
            peak_activity_hours: WindowAggregator::peak_activity_hours(records),
            stress_profile: StressClassifier::stress_profile(records),
            mood: self.predict_mood(records),
        };

        tracing::debug!(
            records = records.len(),
            %start,
            %end,
            peaks = report.peaks.peaks.len(),
            "completed analysis"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecommendationKind;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn vector(pairs: &[(Emotion, f64)]) -> EmotionVector {
        pairs
            .iter()
            .fold(EmotionVector::zero(), |v, (e, x)| v.with(*e, *x).unwrap())
    }

    fn history(vectors: Vec<EmotionVector>) -> Vec<EmotionRecord> {
        let start = Utc.with_ymd_and_hms(2024, 2, 5, 8, 0, 0).unwrap();
        vectors
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                EmotionRecord::new(start + Duration::hours(i as i64 * 5), v, "session-0001").unwrap()
            })
            .collect()
    }

    fn record_json(ts: &str, happy: f64, sad: f64, neutral: f64) -> String {
        format!(
            r#"{{"timestamp":"{ts}","emotions":{{"happy":{happy},"sad":{sad},"angry":0.0,"fearful":0.0,"disgusted":0.0,"surprised":0.0,"neutral":{neutral}}},"session_id":"session-0001"}}"#
        )
    }

    #[test]
    fn test_predict_mood_empty_history() {
        let report = EmotionAnalyzer::default().predict_mood(&[]);

        assert_eq!(report.prediction.dominant_emotion, Emotion::Neutral);
        assert_eq!(report.prediction.confidence, 0.0);
        assert_eq!(report.prediction.trend, Trend::Stable);
        assert_eq!(report.prediction.wellness_score, 0.5);
        assert_eq!(report.prediction.stability_score, 0.7);
        assert_eq!(report.recommendations.len(), 1);
        assert_eq!(report.recommendations[0].kind, RecommendationKind::Start);
        assert_eq!(report.recommendations[0].title, "Begin Your Journey");
        assert_eq!(
            report.insights,
            vec!["Not enough data yet - start by using the emotion detector!".to_string()]
        );
    }

    #[test]
    fn test_predict_mood_improving_happy() {
        let mut vectors = vec![vector(&[(Emotion::Sad, 0.8)]); 3];
        vectors.extend(vec![vector(&[(Emotion::Happy, 0.9)]); 3]);
        let report = EmotionAnalyzer::default().predict_mood(&history(vectors));

        let prediction = &report.prediction;
        assert_eq!(prediction.dominant_emotion, Emotion::Happy);
        assert_eq!(prediction.trend, Trend::Improving);
        assert_eq!(prediction.data_points, 6);

        // lookback weights 0.2..1.0 (total 3.0); happy = 0.9 * 2.4 / 3.0 = 0.72
        assert!((prediction.confidence - 0.72).abs() < 1e-9);
        assert_eq!(
            report.insights[0],
            "Your emotions are clearly trending toward happy feelings"
        );
        assert_eq!(
            report.recommendations.iter().map(|r| r.kind).collect::<Vec<_>>(),
            vec![RecommendationKind::Maintain, RecommendationKind::Creative]
        );
    }

    #[test]
    fn test_predict_mood_low_wellness_prepends_overrides() {
        let vectors = vec![vector(&[(Emotion::Angry, 0.9)]); 4];
        let report = EmotionAnalyzer::default().predict_mood(&history(vectors));

        assert_eq!(report.prediction.wellness_score, 0.0);
        assert_eq!(report.recommendations[0].kind, RecommendationKind::Wellness);
        assert_eq!(report.recommendations[1].kind, RecommendationKind::Release);
        assert!(report
            .insights
            .contains(&"Consider focusing on self-care and support".to_string()));
    }

    #[test]
    fn test_recommend_for_current_without_history() {
        let current = vector(&[(Emotion::Fearful, 0.6), (Emotion::Neutral, 0.4)]);
        let result = EmotionAnalyzer::default().recommend_for_current(&current, &[]);

        assert_eq!(result.context.dominant_emotion, Emotion::Fearful);
        assert!((result.context.confidence - 0.6).abs() < 1e-9);
        assert_eq!(result.context.wellness, 0.5);
        assert_eq!(result.context.stability, 0.7);
        assert_eq!(result.recommendations[0].kind, RecommendationKind::Grounding);
    }

    #[test]
    fn test_recommend_for_current_includes_current_in_scores() {
        let past = history(vec![vector(&[(Emotion::Happy, 1.0)]); 2]);
        let current = vector(&[(Emotion::Angry, 1.0)]);
        let result = EmotionAnalyzer::default().recommend_for_current(&current, &past);

        // wellness samples 1.0, 1.0, 0.0
        assert!((result.context.wellness - 2.0 / 3.0).abs() < 1e-9);
        // happy and angry each have variance 2/9 over the three vectors
        let expected_stability = 1.0 - (4.0 / 9.0 / 7.0) / 0.3;
        assert!((result.context.stability - expected_stability).abs() < 1e-9);
        assert_eq!(result.context.dominant_emotion, Emotion::Angry);
    }

    #[test]
    fn test_analyze_full_report() {
        let records = history(vec![
            vector(&[(Emotion::Happy, 0.2), (Emotion::Neutral, 0.6)]),
            vector(&[(Emotion::Happy, 0.95)]),
            vector(&[(Emotion::Sad, 0.7), (Emotion::Neutral, 0.3)]),
            vector(&[(Emotion::Happy, 0.1), (Emotion::Neutral, 0.8)]),
        ]);
        let start = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 6).unwrap();
        let report = EmotionAnalyzer::default().analyze(&records, start, end).unwrap();

        assert_eq!(report.summary.total_detections, 4);
        assert_eq!(report.hourly_patterns.len(), 24);
        assert_eq!(report.weekday_patterns.len(), 7);
        assert_eq!(report.daily_trends.len(), 2);
        assert_eq!(report.daily_stats.len(), 2);
        assert_eq!(report.peaks.anomalies.len(), 1);
        assert_eq!(report.dominant_distribution[&Emotion::Neutral], 2);
        assert_eq!(report.mood.prediction.data_points, 4);

        let split = report.stress_levels;
        assert!((split.low + split.medium + split.high - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_analyze_rejects_inverted_range() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 6).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();
        let err = EmotionAnalyzer::default().analyze(&[], start, end).unwrap_err();
        assert!(matches!(err, ComputeError::InvalidDateRange(_)));
    }

    #[test]
    fn test_analyze_is_idempotent() {
        let records = history(vec![
            vector(&[(Emotion::Surprised, 0.4), (Emotion::Fearful, 0.5)]),
            vector(&[(Emotion::Disgusted, 0.92)]),
            vector(&[(Emotion::Neutral, 0.7)]),
        ]);
        let day = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();
        let analyzer = EmotionAnalyzer::default();
        let first = analyzer.analyze(&records, day, day).unwrap();
        let second = analyzer.analyze(&records, day, day).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_predict_mood_json() {
        let json = format!(
            "[{},{}]",
            record_json("2024-02-05T10:00:00Z", 0.9, 0.0, 0.1),
            record_json("2024-02-05T09:00:00Z", 0.7, 0.1, 0.2)
        );
        let output = predict_mood_json(&json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["producer"]["name"], crate::PRODUCER_NAME);
        assert_eq!(parsed["report"]["prediction"]["dominant_emotion"], "happy");
        assert_eq!(parsed["report"]["prediction"]["data_points"], 2);
    }

    #[test]
    fn test_recommend_json() {
        let current = r#"{"happy":0.1,"sad":0.0,"angry":0.8,"fearful":0.0,"disgusted":0.0,"surprised":0.0,"neutral":0.1}"#;
        let output = recommend_json(current, "[]").unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["report"]["context"]["dominant_emotion"], "angry");
        assert_eq!(parsed["report"]["context"]["wellness"], 0.5);
        assert_eq!(parsed["report"]["recommendations"][0]["type"], "release");
    }

    #[test]
    fn test_analyze_json_rejects_invalid_record() {
        let json = r#"[{"timestamp":"2024-02-05T10:00:00Z","emotions":{"happy":1.4},"session_id":"session-0001"}]"#;
        let day = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();
        assert!(analyze_json(json, day, day).is_err());
    }
}
