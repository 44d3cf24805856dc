//! Core types for the Emotion Insights engine
//!
//! This module defines the data model consumed by every analysis stage
//! (emotions, vectors, records) and the plain structured results each stage
//! produces. Nothing here performs I/O; every value is derived fresh per call.

use crate::error::ValidationError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Number of canonical emotion labels
pub const EMOTION_COUNT: usize = 7;

/// Session references must be at least this long once trimmed
pub const MIN_SESSION_REF_LEN: usize = 10;

/// Session references must be at most this long once trimmed
pub const MAX_SESSION_REF_LEN: usize = 255;

/// Canonical emotion label.
///
/// Declaration order is the canonical order: it drives iteration, map
/// ordering and the tie-break when two emotions share the maximum value
/// (the earlier label wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Fearful,
    Disgusted,
    Surprised,
    Neutral,
}

impl Emotion {
    /// All canonical emotions in canonical order
    pub const ALL: [Emotion; EMOTION_COUNT] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Fearful,
        Emotion::Disgusted,
        Emotion::Surprised,
        Emotion::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Fearful => "fearful",
            Emotion::Disgusted => "disgusted",
            Emotion::Surprised => "surprised",
            Emotion::Neutral => "neutral",
        }
    }

    /// Parse a canonical label; unknown labels yield `None`
    pub fn from_label(label: &str) -> Option<Emotion> {
        Emotion::ALL.into_iter().find(|e| e.as_str() == label)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-emotion confidences for a single detection.
///
/// All seven canonical emotions are always present, each a finite value in
/// [0, 1]. Values need not sum to 1. Labels outside the canonical set are
/// preserved in `extra` but never take part in aggregation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, f64>",
    into = "BTreeMap<String, f64>"
)]
pub struct EmotionVector {
    values: [f64; EMOTION_COUNT],
    extra: BTreeMap<String, f64>,
}

impl EmotionVector {
    /// The all-zero vector
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build a vector from canonical values given in canonical order
    pub fn new(values: [f64; EMOTION_COUNT]) -> Result<Self, ValidationError> {
        for emotion in Emotion::ALL {
            check_value(emotion, values[emotion.index()])?;
        }
        Ok(Self {
            values,
            extra: BTreeMap::new(),
        })
    }

    /// Build a vector from a label → value map.
    ///
    /// Every canonical label must be present; unknown labels are kept aside.
    pub fn from_map<K, I>(entries: I) -> Result<Self, ValidationError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let mut values = [None; EMOTION_COUNT];
        let mut extra = BTreeMap::new();

        for (label, value) in entries {
            match Emotion::from_label(label.as_ref()) {
                Some(emotion) => {
                    check_value(emotion, value)?;
                    values[emotion.index()] = Some(value);
                }
                None => {
                    extra.insert(label.as_ref().to_string(), value);
                }
            }
        }

        let mut resolved = [0.0; EMOTION_COUNT];
        for emotion in Emotion::ALL {
            resolved[emotion.index()] =
                values[emotion.index()].ok_or(ValidationError::MissingEmotion { emotion })?;
        }

        Ok(Self {
            values: resolved,
            extra,
        })
    }

    /// Return a copy with one canonical value replaced
    pub fn with(mut self, emotion: Emotion, value: f64) -> Result<Self, ValidationError> {
        check_value(emotion, value)?;
        self.values[emotion.index()] = value;
        Ok(self)
    }

    /// Mean of already-validated vectors; callers guarantee `count > 0`
    pub(crate) fn from_sums(sums: [f64; EMOTION_COUNT], count: usize) -> Self {
        let mut values = sums;
        for v in values.iter_mut() {
            *v /= count as f64;
        }
        Self {
            values,
            extra: BTreeMap::new(),
        }
    }

    /// Apply `f` to every canonical value; callers keep results inside [0, 1]
    pub(crate) fn map_values(&self, f: impl Fn(f64) -> f64) -> Self {
        let mut values = self.values;
        for v in values.iter_mut() {
            *v = f(*v);
        }
        Self {
            values,
            extra: self.extra.clone(),
        }
    }

    pub fn get(&self, emotion: Emotion) -> f64 {
        self.values[emotion.index()]
    }

    /// Canonical values in canonical order
    pub fn values(&self) -> &[f64; EMOTION_COUNT] {
        &self.values
    }

    /// Iterate canonical (emotion, value) pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f64)> + '_ {
        Emotion::ALL.into_iter().map(move |e| (e, self.values[e.index()]))
    }

    /// Non-canonical labels preserved from raw input
    pub fn extra(&self) -> &BTreeMap<String, f64> {
        &self.extra
    }

    /// Sum of all canonical values
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Label with the highest value; ties resolve to the earliest canonical label
    pub fn dominant(&self) -> (Emotion, f64) {
        let mut best = (Emotion::ALL[0], self.values[0]);
        for (emotion, value) in self.iter().skip(1) {
            if value > best.1 {
                best = (emotion, value);
            }
        }
        best
    }
}

fn check_value(emotion: Emotion, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { emotion });
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(ValidationError::ValueOutOfRange { emotion, value });
    }
    Ok(())
}

impl TryFrom<BTreeMap<String, f64>> for EmotionVector {
    type Error = ValidationError;

    fn try_from(map: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        EmotionVector::from_map(map)
    }
}

impl From<EmotionVector> for BTreeMap<String, f64> {
    fn from(vector: EmotionVector) -> Self {
        let mut map = vector.extra;
        for emotion in Emotion::ALL {
            map.insert(emotion.as_str().to_string(), vector.values[emotion.index()]);
        }
        map
    }
}

impl AsRef<EmotionVector> for EmotionVector {
    fn as_ref(&self) -> &EmotionVector {
        self
    }
}

/// A single timestamped detection
///
/// Deserialization goes through `RawRecord`, so a decoded record is always valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "crate::adapter::RawRecord")]
pub struct EmotionRecord {
    /// Detection instant (UTC)
    pub timestamp: DateTime<Utc>,
    /// Normalized emotion vector
    pub emotions: EmotionVector,
    /// Raw detector confidences, if the detector reported them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_scores: Option<EmotionVector>,
    /// Detection session this record belongs to
    pub session_id: String,
}

impl EmotionRecord {
    /// Create a record, validating the session reference
    pub fn new(
        timestamp: DateTime<Utc>,
        emotions: EmotionVector,
        session_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let record = Self {
            timestamp,
            emotions,
            confidence_scores: None,
            session_id: session_id.into().trim().to_string(),
        };
        record.validate()?;
        Ok(record)
    }

    /// Attach raw detector confidences
    pub fn with_confidence_scores(mut self, scores: EmotionVector) -> Self {
        self.confidence_scores = Some(scores);
        self
    }

    /// Validate fields not already enforced by `EmotionVector`
    pub fn validate(&self) -> Result<(), ValidationError> {
        let length = self.session_id.trim().chars().count();
        if !(MIN_SESSION_REF_LEN..=MAX_SESSION_REF_LEN).contains(&length) {
            return Err(ValidationError::InvalidSessionRef { length });
        }
        Ok(())
    }

    /// Highest raw confidence, falling back to the highest vector value
    pub fn max_confidence(&self) -> f64 {
        let source = self.confidence_scores.as_ref().unwrap_or(&self.emotions);
        source.values().iter().copied().fold(0.0, f64::max)
    }
}

impl AsRef<EmotionVector> for EmotionRecord {
    fn as_ref(&self) -> &EmotionVector {
        &self.emotions
    }
}

/// Per-emotion mean over a reference record set.
///
/// Emotions never observed have no entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    /// Mean confidence per observed emotion
    pub means: BTreeMap<Emotion, f64>,
    /// Number of records the means were computed over
    pub record_count: usize,
}

impl Baseline {
    pub fn get(&self, emotion: Emotion) -> Option<f64> {
        self.means.get(&emotion).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    /// Ratio of `value` to the emotion's baseline; 1 when the baseline is
    /// missing or zero
    pub fn intensity(&self, emotion: Emotion, value: f64) -> f64 {
        match self.get(emotion) {
            Some(base) if base > 0.0 => value / base,
            _ => 1.0,
        }
    }
}

/// One aggregation bucket with its averaged vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket<K> {
    /// Bucket key (hour, weekday index, or calendar date)
    pub key: K,
    /// Number of records that fell in the bucket
    pub count: usize,
    /// Mean vector; zero when `count == 0`
    pub emotions: EmotionVector,
}

/// Overall summary of a record set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_detections: usize,
    pub average_emotions: EmotionVector,
    pub dominant_emotion: Emotion,
    pub session_count: usize,
    pub first_timestamp: Option<DateTime<Utc>>,
    pub last_timestamp: Option<DateTime<Utc>>,
}

/// Per-calendar-day statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub detections: usize,
    pub sessions: usize,
    pub dominant_emotion: Emotion,
    pub average_confidence: f64,
}

/// A value well above its baseline and absolutely high
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub timestamp: DateTime<Utc>,
    pub emotion: Emotion,
    pub value: f64,
    pub baseline: f64,
    pub intensity: f64,
}

/// Kind of absolute-threshold anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    HighIntensity,
}

/// A value above the absolute anomaly threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub timestamp: DateTime<Utc>,
    pub emotion: Emotion,
    pub value: f64,
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
}

/// Peak and anomaly detection output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakReport {
    /// Strongest peaks, intensity descending
    pub peaks: Vec<Peak>,
    /// Most recent anomalies, in source order
    pub anomalies: Vec<Anomaly>,
    /// Baselines the peaks were measured against
    pub baselines: Baseline,
}

/// Scalar scores derived from recent history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub wellness: f64,
    pub stability: f64,
    pub dominant_emotion: Emotion,
    pub confidence: f64,
}

/// Direction of recent wellness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Declining => "declining",
            Trend::Stable => "stable",
        }
    }
}

/// Mood prediction for a record history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodPrediction {
    pub dominant_emotion: Emotion,
    pub confidence: f64,
    pub trend: Trend,
    pub wellness_score: f64,
    pub stability_score: f64,
    pub data_points: usize,
}

/// Stress bucket of a single record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressBucket {
    /// Dominant emotion is positive
    Low,
    /// Dominant emotion is neither positive nor stressful
    Medium,
    /// Dominant emotion is stressful
    High,
}

/// Percentage of records per stress bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressLevels {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

/// Stress score of a single record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressSample {
    pub timestamp: DateTime<Utc>,
    pub stress_level: f64,
    pub dominant_emotion: Emotion,
}

/// Overall stress category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressCategory {
    Low,
    Moderate,
    High,
}

/// Hour of day with elevated mean stress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyStress {
    pub hour: u32,
    pub avg_stress: f64,
}

/// Stress scores over a record set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressProfile {
    pub average_stress: f64,
    pub max_stress: f64,
    pub stress_category: StressCategory,
    pub timeline: Vec<StressSample>,
    pub peak_stress_hours: Vec<HourlyStress>,
}

/// Tag describing what a recommendation addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Maintain,
    Creative,
    Support,
    Connection,
    Mindfulness,
    Release,
    Cooling,
    Expression,
    Process,
    Adaptation,
    Grounding,
    Safety,
    Breathing,
    Awareness,
    Engagement,
    Stability,
    Wellness,
    Start,
}

/// A suggested activity. Priority is the position in the returned list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
    pub action: String,
    pub duration: String,
    pub icon: String,
}

impl Recommendation {
    pub fn new(
        kind: RecommendationKind,
        title: &str,
        description: &str,
        action: &str,
        duration: &str,
        icon: &str,
    ) -> Self {
        Self {
            kind,
            title: title.to_string(),
            description: description.to_string(),
            action: action.to_string(),
            duration: duration.to_string(),
            icon: icon.to_string(),
        }
    }
}

/// Mood prediction with its recommendations and insight messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodReport {
    pub prediction: MoodPrediction,
    pub recommendations: Vec<Recommendation>,
    pub insights: Vec<String>,
}

/// Recommendations for a current emotion state, with the scores used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentRecommendations {
    pub recommendations: Vec<Recommendation>,
    pub context: ScoreResult,
}

/// Full analysis of one user's record set over a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: Summary,
    pub hourly_patterns: Vec<Bucket<u32>>,
    pub weekday_patterns: Vec<Bucket<u32>>,
    pub daily_trends: Vec<Bucket<NaiveDate>>,
    pub daily_stats: Vec<DailyStat>,
    pub peaks: PeakReport,
    pub stress_levels: StressLevels,
    pub emotion_correlations: BTreeMap<Emotion, f64>,
    pub dominant_distribution: BTreeMap<Emotion, usize>,
    pub peak_activity_hours: Vec<u32>,
    pub stress_profile: StressProfile,
    pub mood: MoodReport,
}
