//! Demo estimator for running without a trained model
//!
//! Only used when configuration selects it explicitly. Every estimate it
//! produces is tagged [`EstimatorKind::Placeholder`].

use super::{ModelOutput, PredictiveModel};
use crate::error::InferenceError;
use crate::models::EstimatorKind;
use crate::params::FeatureVector;

/// Constant returned when no other value is configured (kWh/m²)
pub const DEFAULT_PLACEHOLDER_VALUE: f64 = 22.0;

/// Returns the same configured value for every row
#[derive(Debug, Clone)]
pub struct PlaceholderEstimator {
    value: f64,
}

impl PlaceholderEstimator {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Default for PlaceholderEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER_VALUE)
    }
}

impl PredictiveModel for PlaceholderEstimator {
    fn predict(&self, rows: &[FeatureVector]) -> Result<ModelOutput, InferenceError> {
        Ok(ModelOutput::Batch(vec![self.value; rows.len()]))
    }

    fn model_version(&self) -> &str {
        "placeholder"
    }

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Placeholder
    }
}
