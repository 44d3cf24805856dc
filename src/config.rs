//! Analysis configuration
//!
//! Every threshold, window size and weight used by the engine lives in an
//! `AnalyticsConfig` value. The default is a `const`; callers may load an
//! override from JSON, but a config is never mutated once handed to an
//! analyzer.

use crate::error::ComputeError;
use crate::types::Emotion;
use serde::{Deserialize, Serialize};

/// Per-emotion valence weights used by the wellness score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionWeights {
    pub happy: f64,
    pub sad: f64,
    pub angry: f64,
    pub fearful: f64,
    pub disgusted: f64,
    pub surprised: f64,
    pub neutral: f64,
}

/// Default valence weights
pub const DEFAULT_WEIGHTS: EmotionWeights = EmotionWeights {
    happy: 1.0,
    sad: -0.8,
    angry: -1.0,
    fearful: -0.7,
    disgusted: -0.6,
    surprised: 0.3,
    neutral: 0.0,
};

impl Default for EmotionWeights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

impl EmotionWeights {
    pub fn weight(&self, emotion: Emotion) -> f64 {
        match emotion {
            Emotion::Happy => self.happy,
            Emotion::Sad => self.sad,
            Emotion::Angry => self.angry,
            Emotion::Fearful => self.fearful,
            Emotion::Disgusted => self.disgusted,
            Emotion::Surprised => self.surprised,
            Emotion::Neutral => self.neutral,
        }
    }
}

/// Thresholds and windows for every analysis stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Valence weights for wellness
    pub weights: EmotionWeights,
    /// Most recent records scored for wellness
    pub wellness_window: usize,
    /// Most recent records scored for stability
    pub stability_window: usize,
    /// Below this many records stability falls back to its default
    pub stability_min_records: usize,
    /// Variance regarded as typical fluctuation
    pub stability_normalizer: f64,
    /// Lowest stability reported for any non-degenerate history
    pub stability_floor: f64,
    /// Records considered for the recency-weighted dominant emotion
    pub dominant_lookback: usize,
    /// Records in each of the two trend windows
    pub trend_window: usize,
    /// Below this many records the trend is always stable
    pub trend_min_records: usize,
    /// Wellness change needed to call a trend
    pub trend_delta: f64,
    /// Peak requires value > baseline × multiplier
    pub peak_multiplier: f64,
    /// Peak requires value above this absolute floor
    pub peak_floor: f64,
    /// Values above this are anomalies
    pub anomaly_threshold: f64,
    /// Maximum peaks returned
    pub peak_limit: usize,
    /// Maximum anomalies returned
    pub anomaly_limit: usize,
    /// Maximum recommendations returned
    pub recommendation_limit: usize,
    /// Stability below this adds a stability recommendation
    pub low_stability_threshold: f64,
    /// Wellness below this adds a wellness recommendation
    pub low_wellness_threshold: f64,
}

/// Default configuration
pub const DEFAULT_CONFIG: AnalyticsConfig = AnalyticsConfig {
    weights: DEFAULT_WEIGHTS,
    wellness_window: 10,
    stability_window: 5,
    stability_min_records: 3,
    stability_normalizer: 0.3,
    stability_floor: 0.1,
    dominant_lookback: 5,
    trend_window: 3,
    trend_min_records: 5,
    trend_delta: 0.1,
    peak_multiplier: 1.5,
    peak_floor: 0.7,
    anomaly_threshold: 0.9,
    peak_limit: 20,
    anomaly_limit: 10,
    recommendation_limit: 4,
    low_stability_threshold: 0.4,
    low_wellness_threshold: 0.3,
};

impl Default for AnalyticsConfig {
    fn default() -> Self {
        DEFAULT_CONFIG
    }
}

impl AnalyticsConfig {
    /// Load a configuration from JSON; omitted fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: AnalyticsConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to pretty JSON
    pub fn to_json(&self) -> Result<String, ComputeError> {
        serde_json::to_string_pretty(self).map_err(ComputeError::JsonError)
    }

    /// Reject non-finite numbers and empty windows
    pub fn validate(&self) -> Result<(), ComputeError> {
        let windows = [
            ("wellness_window", self.wellness_window),
            ("stability_window", self.stability_window),
            ("dominant_lookback", self.dominant_lookback),
            ("trend_window", self.trend_window),
        ];
        for (name, size) in windows {
            if size == 0 {
                return Err(ComputeError::ConfigError(format!("{name} must be at least 1")));
            }
        }

        let weights = Emotion::ALL.map(|e| self.weights.weight(e));
        let numbers = [
            self.stability_normalizer,
            self.stability_floor,
            self.trend_delta,
            self.peak_multiplier,
            self.peak_floor,
            self.anomaly_threshold,
            self.low_stability_threshold,
            self.low_wellness_threshold,
        ];
        if weights.iter().chain(numbers.iter()).any(|v| !v.is_finite()) {
            return Err(ComputeError::ConfigError(
                "weights and thresholds must be finite".to_string(),
            ));
        }

        if self.stability_normalizer <= 0.0 {
            return Err(ComputeError::ConfigError(
                "stability_normalizer must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
