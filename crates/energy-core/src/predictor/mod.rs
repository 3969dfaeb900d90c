//! Predictive model backends
//!
//! The service treats the model as an opaque function from feature rows to
//! one value per row. Backends: a JSON linear-regression artifact, an ONNX
//! export run through tract, and an explicitly configured placeholder.

mod linear;
mod loader;
mod onnx;
mod placeholder;

pub use linear::{LinearArtifact, LinearModel};
pub use loader::{load_model, ModelConfig, ModelFormat};
pub use onnx::OnnxModel;
pub use placeholder::{PlaceholderEstimator, DEFAULT_PLACEHOLDER_VALUE};

use crate::error::InferenceError;
use crate::models::EstimatorKind;
use crate::params::FeatureVector;
use std::sync::Arc;

/// Output of one `predict` call
///
/// Backends return either a bare scalar or one value per input row. Any
/// other shape must be reported by the backend as
/// [`InferenceError::UnexpectedOutputShape`].
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutput {
    Scalar(f64),
    Batch(Vec<f64>),
}

impl ModelOutput {
    /// Normalize a single-row prediction to one value
    pub fn into_single(self) -> Result<f64, InferenceError> {
        match self {
            ModelOutput::Scalar(value) => Ok(value),
            ModelOutput::Batch(values) => match values.as_slice() {
                [value] => Ok(*value),
                [] => Err(InferenceError::UnexpectedOutputShape(
                    "model returned an empty batch".to_string(),
                )),
                _ => Err(InferenceError::UnexpectedOutputShape(format!(
                    "expected 1 value for a single-row batch, got {}",
                    values.len()
                ))),
            },
        }
    }
}

/// Trait for prediction implementations
///
/// Implementations are loaded once and shared read-only across requests.
pub trait PredictiveModel: Send + Sync {
    /// Predict one value per feature row
    fn predict(&self, rows: &[FeatureVector]) -> Result<ModelOutput, InferenceError>;

    /// Get current model version
    fn model_version(&self) -> &str;

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Model
    }
}

/// Model handed to the inference service at construction
#[derive(Clone)]
pub enum ModelSlot {
    Loaded(Arc<dyn PredictiveModel>),
    /// Startup could not produce a model; every request reports it
    Unavailable(String),
}

impl ModelSlot {
    pub fn loaded(model: impl PredictiveModel + 'static) -> Self {
        ModelSlot::Loaded(Arc::new(model))
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelSlot::Loaded(_))
    }

    pub fn model(&self) -> Result<&Arc<dyn PredictiveModel>, InferenceError> {
        match self {
            ModelSlot::Loaded(model) => Ok(model),
            ModelSlot::Unavailable(reason) => Err(InferenceError::ModelUnavailable(reason.clone())),
        }
    }
}

impl std::fmt::Debug for ModelSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelSlot::Loaded(model) => f
                .debug_struct("Loaded")
                .field("version", &model.model_version())
                .field("kind", &model.kind())
                .finish(),
            ModelSlot::Unavailable(reason) => f.debug_tuple("Unavailable").field(reason).finish(),
        }
    }
}

impl From<Arc<dyn PredictiveModel>> for ModelSlot {
    fn from(model: Arc<dyn PredictiveModel>) -> Self {
        ModelSlot::Loaded(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_output_normalizes() {
        assert_eq!(ModelOutput::Scalar(21.5).into_single().unwrap(), 21.5);
    }

    #[test]
    fn test_single_row_batch_normalizes() {
        assert_eq!(ModelOutput::Batch(vec![21.5]).into_single().unwrap(), 21.5);
    }

    #[test]
    fn test_bad_shapes_rejected() {
        let err = ModelOutput::Batch(vec![]).into_single().unwrap_err();
        assert_eq!(err.reason(), "unexpected_output_shape");

        let err = ModelOutput::Batch(vec![1.0, 2.0]).into_single().unwrap_err();
        assert_eq!(err.reason(), "unexpected_output_shape");
    }

    #[test]
    fn test_unavailable_slot_reports_reason() {
        let slot = ModelSlot::Unavailable("artifact missing".to_string());
        assert!(!slot.is_loaded());
        let err = slot.model().err().unwrap();
        assert_eq!(err.reason(), "model_unavailable");
        assert!(err.to_string().contains("artifact missing"));
    }
}
