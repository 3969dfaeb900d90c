//! ONNX Runtime inference using tract
//!
//! Runs an ONNX export of the regression model (e.g. from skl2onnx) with
//! tract-onnx. The graph is optimized for a fixed `[1, 8]` f32 input, so a
//! batch is evaluated one row at a time.

use super::{ModelOutput, PredictiveModel};
use crate::error::{InferenceError, ModelLoadError};
use crate::params::{FeatureVector, FEATURE_COUNT};
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, warn};

/// Maximum inference latency before warning
const MAX_INFERENCE_MS: u128 = 5;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX-based regression model
pub struct OnnxModel {
    model: TractModel,
    version: String,
}

impl OnnxModel {
    /// Create a model from ONNX bytes
    pub fn new(model_bytes: &[u8], version: impl Into<String>) -> Result<Self, ModelLoadError> {
        let model = Self::load_model(model_bytes).map_err(|e| ModelLoadError::Onnx(format!("{:#}", e)))?;
        Ok(Self {
            model,
            version: version.into(),
        })
    }

    /// Load and optimize an ONNX model from bytes
    fn load_model(model_bytes: &[u8]) -> TractResult<TractModel> {
        tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))?
            .with_input_fact(0, f32::fact([1, FEATURE_COUNT]).into())?
            .into_optimized()?
            .into_runnable()
    }

    fn row_to_tensor(row: &FeatureVector) -> Result<Tensor, InferenceError> {
        let data: Vec<f32> = row.iter().map(|v| *v as f32).collect();
        tract_ndarray::Array2::from_shape_vec((1, FEATURE_COUNT), data)
            .map(Into::into)
            .map_err(|e| InferenceError::ModelFailure(e.to_string()))
    }

    fn run_row(&self, row: &FeatureVector) -> Result<f64, InferenceError> {
        let input = Self::row_to_tensor(row)?;
        let result = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::ModelFailure(format!("{:#}", e)))?;
        let output = result
            .first()
            .ok_or_else(|| InferenceError::UnexpectedOutputShape("no output from model".to_string()))?;
        tensor_value(output)
    }
}

/// Extract the single regression value of one row
///
/// Regression exports produce `[1, 1]`, `[1]` or a rank-0 tensor.
fn tensor_value(output: &Tensor) -> Result<f64, InferenceError> {
    let view = output
        .to_array_view::<f32>()
        .map_err(|e| InferenceError::ModelFailure(format!("{:#}", e)))?;
    let shape = view.shape().to_vec();
    match shape.as_slice() {
        [] | [1] | [1, 1] => view
            .iter()
            .next()
            .map(|v| f64::from(*v))
            .ok_or_else(|| InferenceError::UnexpectedOutputShape(format!("{:?}", shape))),
        _ => Err(InferenceError::UnexpectedOutputShape(format!(
            "expected one value per row, got tensor shape {:?}",
            shape
        ))),
    }
}

impl PredictiveModel for OnnxModel {
    fn predict(&self, rows: &[FeatureVector]) -> Result<ModelOutput, InferenceError> {
        let start = Instant::now();

        let values = rows
            .iter()
            .map(|row| self.run_row(row))
            .collect::<Result<Vec<_>, _>>()?;

        let elapsed = start.elapsed();
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            warn!(elapsed_ms = elapsed.as_millis(), "Inference exceeded {}ms target", MAX_INFERENCE_MS);
        } else {
            debug!(elapsed_us = elapsed.as_micros(), rows = rows.len(), "Inference completed");
        }

        Ok(ModelOutput::Batch(values))
    }

    fn model_version(&self) -> &str {
        &self.version
    }
}
