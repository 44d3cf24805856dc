//! Report encoding
//!
//! This module rounds analysis results for presentation and wraps them in a
//! payload carrying producer metadata. Rounding happens only here; every
//! stage computes on unrounded values.
//!
//! Decimals: 3 for baselines, bucket averages, daily confidence, peak values
//! and stress scores; 2 for wellness, stability, confidence, intensity and
//! percentages.

use crate::error::ComputeError;
use crate::types::{
    AnalysisReport, Anomaly, Baseline, Bucket, CurrentRecommendations, DailyStat, MoodPrediction,
    MoodReport, Peak, PeakReport, ScoreResult, StressLevels, StressProfile, Summary,
};
use crate::{INSIGHTS_VERSION, PRODUCER_NAME};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current report payload version
pub const REPORT_VERSION: &str = "1.0.0";

/// Producer metadata attached to every payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Rounded report with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload<T> {
    pub report_version: String,
    pub producer: Producer,
    pub computed_at_utc: String,
    pub report: T,
}

/// Values that can be rounded for presentation
pub trait Presentable: Sized {
    fn rounded(&self) -> Self;
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

impl Presentable for Baseline {
    fn rounded(&self) -> Self {
        Baseline {
            means: self.means.iter().map(|(e, v)| (*e, round_to(*v, 3))).collect(),
            record_count: self.record_count,
        }
    }
}

impl<K: Clone> Presentable for Bucket<K> {
    fn rounded(&self) -> Self {
        Bucket {
            key: self.key.clone(),
            count: self.count,
            emotions: self.emotions.map_values(|v| round_to(v, 3)),
        }
    }
}

impl Presentable for Summary {
    fn rounded(&self) -> Self {
        Summary {
            average_emotions: self.average_emotions.map_values(|v| round_to(v, 3)),
            ..self.clone()
        }
    }
}

impl Presentable for DailyStat {
    fn rounded(&self) -> Self {
        DailyStat {
            average_confidence: round_to(self.average_confidence, 3),
            ..self.clone()
        }
    }
}

impl Presentable for Peak {
    fn rounded(&self) -> Self {
        Peak {
            value: round_to(self.value, 3),
            baseline: round_to(self.baseline, 3),
            intensity: round_to(self.intensity, 2),
            ..self.clone()
        }
    }
}

impl Presentable for Anomaly {
    fn rounded(&self) -> Self {
        Anomaly {
            value: round_to(self.value, 3),
            ..self.clone()
        }
    }
}

impl Presentable for PeakReport {
    fn rounded(&self) -> Self {
        PeakReport {
            peaks: self.peaks.iter().map(Peak::rounded).collect(),
            anomalies: self.anomalies.iter().map(Anomaly::rounded).collect(),
            baselines: self.baselines.rounded(),
        }
    }
}

impl Presentable for ScoreResult {
    fn rounded(&self) -> Self {
        ScoreResult {
            wellness: round_to(self.wellness, 2),
            stability: round_to(self.stability, 2),
            dominant_emotion: self.dominant_emotion,
            confidence: round_to(self.confidence, 2),
        }
    }
}

impl Presentable for MoodPrediction {
    fn rounded(&self) -> Self {
        MoodPrediction {
            confidence: round_to(self.confidence, 2),
            wellness_score: round_to(self.wellness_score, 2),
            stability_score: round_to(self.stability_score, 2),
            ..self.clone()
        }
    }
}

impl Presentable for MoodReport {
    fn rounded(&self) -> Self {
        MoodReport {
            prediction: self.prediction.rounded(),
            recommendations: self.recommendations.clone(),
            insights: self.insights.clone(),
        }
    }
}

impl Presentable for CurrentRecommendations {
    fn rounded(&self) -> Self {
        CurrentRecommendations {
            recommendations: self.recommendations.clone(),
            context: self.context.rounded(),
        }
    }
}

impl Presentable for StressLevels {
    fn rounded(&self) -> Self {
        StressLevels {
            low: round_to(self.low, 2),
            medium: round_to(self.medium, 2),
            high: round_to(self.high, 2),
        }
    }
}

impl Presentable for StressProfile {
    fn rounded(&self) -> Self {
        let mut profile = self.clone();
        profile.average_stress = round_to(profile.average_stress, 3);
        profile.max_stress = round_to(profile.max_stress, 3);
        for sample in profile.timeline.iter_mut() {
            sample.stress_level = round_to(sample.stress_level, 3);
        }
        for hour in profile.peak_stress_hours.iter_mut() {
            hour.avg_stress = round_to(hour.avg_stress, 3);
        }
        profile
    }
}

impl Presentable for AnalysisReport {
    fn rounded(&self) -> Self {
        AnalysisReport {
            summary: self.summary.rounded(),
            hourly_patterns: self.hourly_patterns.iter().map(Bucket::rounded).collect(),
            weekday_patterns: self.weekday_patterns.iter().map(Bucket::rounded).collect(),
            daily_trends: self.daily_trends.iter().map(Bucket::rounded).collect(),
            daily_stats: self.daily_stats.iter().map(DailyStat::rounded).collect(),
            peaks: self.peaks.rounded(),
            stress_levels: self.stress_levels.rounded(),
            emotion_correlations: self
                .emotion_correlations
                .iter()
                .map(|(e, v)| (*e, round_to(*v, 2)))
                .collect(),
            dominant_distribution: self.dominant_distribution.clone(),
            peak_activity_hours: self.peak_activity_hours.clone(),
            stress_profile: self.stress_profile.rounded(),
            mood: self.mood.rounded(),
        }
    }
}

/// Encoder producing rounded payloads with producer metadata
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Round a report and wrap it in a payload
    pub fn encode<T: Presentable>(&self, report: &T) -> ReportPayload<T> {
        ReportPayload {
            report_version: REPORT_VERSION.to_string(),
            producer: Producer {
                name: PRODUCER_NAME.to_string(),
                version: INSIGHTS_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            report: report.rounded(),
        }
    }

    /// Encode to a JSON string
    pub fn encode_to_json<T: Presentable + Serialize>(&self, report: &T) -> Result<String, ComputeError> {
        let payload = self.encode(report);
        serde_json::to_string(&payload).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }
}
