//! Emotion Insights - Analytics and scoring engine for emotion detections
//!
//! Insights turns an ordered sequence of timestamped emotion-confidence vectors
//! into behavioral summaries through deterministic, closed-form stages:
//! windowed aggregation → baselines → peak/anomaly detection → stress
//! classification → wellness/stability scoring → trend → recommendations.
//!
//! Every stage is a pure function of its input and an immutable
//! [`AnalyticsConfig`]; nothing is cached between calls.

pub mod adapter;
pub mod baseline;
pub mod config;
pub mod encoder;
pub mod error;
pub mod peaks;
pub mod pipeline;
pub mod recommend;
pub mod scoring;
pub mod stress;
pub mod trend;
pub mod types;
pub mod window;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use adapter::{RawRecord, RecordAdapter};
pub use baseline::BaselineTracker;
pub use config::{AnalyticsConfig, EmotionWeights, DEFAULT_CONFIG};
pub use encoder::ReportEncoder;
pub use error::{ComputeError, ValidationError};
pub use peaks::PeakAnomalyDetector;
pub use pipeline::{analyze_json, predict_mood_json, recommend_json, EmotionAnalyzer};
pub use recommend::RecommendationEngine;
pub use scoring::StabilityWellnessScorer;
pub use stress::StressClassifier;
pub use trend::TrendClassifier;
pub use types::{Emotion, EmotionRecord, EmotionVector};
pub use window::WindowAggregator;

/// Library version embedded in all report payloads
pub const INSIGHTS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report payloads
pub const PRODUCER_NAME: &str = "emotion-insights";
