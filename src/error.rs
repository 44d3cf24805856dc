//! Error types for Emotion Insights

use crate::types::Emotion;
use thiserror::Error;

/// Errors that can occur while preparing input or encoding results
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse records: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

/// Malformed emotion data rejected at the data-model boundary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Missing canonical emotion: {emotion}")]
    MissingEmotion { emotion: Emotion },

    #[error("Value for {emotion} out of range [0, 1]: {value}")]
    ValueOutOfRange { emotion: Emotion, value: f64 },

    #[error("Value for {emotion} is not a finite number")]
    NonFiniteValue { emotion: Emotion },

    #[error("Session reference must be 10-255 characters, got {length}")]
    InvalidSessionRef { length: usize },
}
