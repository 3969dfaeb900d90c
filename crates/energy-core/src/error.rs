//! Error types for validation, model loading and inference

use crate::params::ValueRange;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Why a raw parameter value was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// Value lies outside the field's closed range
    OutOfRange,
    /// Integer field received a fractional value
    NotInteger,
    /// NaN or infinite value
    NotFinite,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ValidationErrorKind::OutOfRange => "out of range",
            ValidationErrorKind::NotInteger => "not a whole number",
            ValidationErrorKind::NotFinite => "not a finite number",
        };
        f.write_str(text)
    }
}

/// Field-level rejection of a raw parameter value
#[derive(Debug, Clone, Copy, PartialEq, Error, Serialize)]
#[error("invalid {field}: {value} is {kind}, expected {expected_range}")]
pub struct ValidationError {
    pub field: &'static str,
    pub value: f64,
    pub expected_range: ValueRange,
    pub kind: ValidationErrorKind,
}

/// Failure of a single inference call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("unexpected model output shape: {0}")]
    UnexpectedOutputShape(String),

    #[error("invalid prediction value: {0}")]
    InvalidPredictionValue(f64),

    #[error("model failure: {0}")]
    ModelFailure(String),
}

impl InferenceError {
    /// Stable machine-readable reason code
    pub fn reason(&self) -> &'static str {
        match self {
            InferenceError::ModelUnavailable(_) => "model_unavailable",
            InferenceError::UnexpectedOutputShape(_) => "unexpected_output_shape",
            InferenceError::InvalidPredictionValue(_) => "invalid_prediction_value",
            InferenceError::ModelFailure(_) => "model_failure",
        }
    }
}

/// Either half of the raw-input-to-estimate pipeline can fail
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Failure to load a model artifact at startup
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("no model path configured")]
    MissingPath,

    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("model checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("cannot infer model format from {0}, set the format explicitly")]
    UnknownFormat(String),

    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to load ONNX model: {0}")]
    Onnx(String),

    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),
}

/// Invalid post-processing configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("cooling share must lie within [0, 1], got {0}")]
    CoolingShareOutOfRange(f64),

    #[error("impact weight for {field} must be finite and non-negative, got {value}")]
    InvalidImpactWeight { field: &'static str, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes() {
        assert_eq!(
            InferenceError::ModelUnavailable("missing".into()).reason(),
            "model_unavailable"
        );
        assert_eq!(
            InferenceError::UnexpectedOutputShape("2 rows".into()).reason(),
            "unexpected_output_shape"
        );
        assert_eq!(
            InferenceError::InvalidPredictionValue(f64::NAN).reason(),
            "invalid_prediction_value"
        );
        assert_eq!(InferenceError::ModelFailure("boom".into()).reason(), "model_failure");
    }

    #[test]
    fn test_validation_error_message_names_field() {
        let err = ValidationError {
            field: "wall_area",
            value: 500.0,
            expected_range: ValueRange::new(294.0, 416.0),
            kind: ValidationErrorKind::OutOfRange,
        };
        let msg = err.to_string();
        assert!(msg.contains("wall_area"), "message was {}", msg);
        assert!(msg.contains("[294, 416]"), "message was {}", msg);
    }
}
