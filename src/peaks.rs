//! Peak and anomaly detection
//!
//! Two independent classifications per (record, emotion) value:
//! - a peak is well above the emotion's baseline AND above an absolute floor
//! - an anomaly is above an absolute threshold, whatever the baseline
//!
//! Peaks are ranked by intensity; anomalies keep source order and only the
//! most recent ones are returned.

use crate::baseline::BaselineTracker;
use crate::config::AnalyticsConfig;
use crate::types::{Anomaly, AnomalyKind, Baseline, EmotionRecord, Peak, PeakReport};

/// Detects baseline-relative peaks and absolute anomalies
pub struct PeakAnomalyDetector {
    config: AnalyticsConfig,
}

impl Default for PeakAnomalyDetector {
    fn default() -> Self {
        Self::new(AnalyticsConfig::default())
    }
}

impl PeakAnomalyDetector {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    /// Detect against a baseline computed from the same records
    pub fn detect(&self, records: &[EmotionRecord]) -> PeakReport {
        let baseline = BaselineTracker::compute(records);
        self.detect_with_baseline(records, baseline)
    }

    /// Detect against an externally supplied baseline
    pub fn detect_with_baseline(&self, records: &[EmotionRecord], baseline: Baseline) -> PeakReport {
        let mut peaks = Vec::new();
        let mut anomalies = Vec::new();

        for record in records {
            for (emotion, value) in record.emotions.iter() {
                let base = baseline.get(emotion).unwrap_or(0.0);

                if self.is_peak(value, base) {
                    peaks.push(Peak {
                        timestamp: record.timestamp,
                        emotion,
                        value,
                        baseline: base,
                        intensity: baseline.intensity(emotion, value),
                    });
                }

                if self.is_anomaly(value) {
                    anomalies.push(Anomaly {
                        timestamp: record.timestamp,
                        emotion,
                        value,
                        kind: AnomalyKind::HighIntensity,
                    });
                }
            }
        }

        // stable: equal intensities keep source order
        peaks.sort_by(|a, b| b.intensity.total_cmp(&a.intensity));
        peaks.truncate(self.config.peak_limit);

        let skip = anomalies.len().saturating_sub(self.config.anomaly_limit);
        let anomalies: Vec<Anomaly> = anomalies.into_iter().skip(skip).collect();

        tracing::debug!(
            records = records.len(),
            peaks = peaks.len(),
            anomalies = anomalies.len(),
            "detected peaks and anomalies"
        );

        PeakReport {
            peaks,
            anomalies,
            baselines: baseline,
        }
    }

    /// Both conditions are required: relative to baseline and absolute
    pub fn is_peak(&self, value: f64, baseline: f64) -> bool {
        value > baseline * self.config.peak_multiplier && value > self.config.peak_floor
    }

    pub fn is_anomaly(&self, value: f64) -> bool {
        value > self.config.anomaly_threshold
    }
}
