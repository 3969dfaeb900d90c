//! Inference orchestration
//!
//! Drives one request through validation, prediction and decomposition.
//! The service holds no per-request state; it can be shared behind an
//! `Arc` and called from any number of threads.

use crate::decompose::LoadDecomposer;
use crate::error::{EstimateError, InferenceError, ValidationError};
use crate::models::{EnergyEstimate, EstimatorKind};
use crate::observability::{PredictorMetrics, StructuredLogger};
use crate::params::{ParameterSet, RawParameters};
use crate::predictor::ModelSlot;
use std::time::Instant;
use tracing::debug;

/// Stage of a single inference request
///
/// `Idle → Validating → Predicting → Decomposing → Done`; any stage may
/// end in `Failed`. Nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InferenceStage {
    Idle,
    Validating,
    Predicting,
    Decomposing,
    Done,
    Failed,
}

impl InferenceStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            InferenceStage::Idle => "idle",
            InferenceStage::Validating => "validating",
            InferenceStage::Predicting => "predicting",
            InferenceStage::Decomposing => "decomposing",
            InferenceStage::Done => "done",
            InferenceStage::Failed => "failed",
        }
    }
}

/// Orchestrates validation → prediction → decomposition
#[derive(Debug, Clone)]
pub struct InferenceService {
    model: ModelSlot,
    decomposer: LoadDecomposer,
    metrics: PredictorMetrics,
    logger: StructuredLogger,
}

impl InferenceService {
    /// Create a service around an already-loaded (or unavailable) model
    pub fn new(model: ModelSlot, decomposer: LoadDecomposer) -> Self {
        let service = Self {
            model,
            decomposer,
            metrics: PredictorMetrics::new(),
            logger: StructuredLogger::new("energy-predictor"),
        };
        service.record_model_info();
        service
    }

    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    fn record_model_info(&self) {
        match &self.model {
            ModelSlot::Loaded(model) => {
                self.metrics.set_model_info(model.model_version(), model.kind());
                self.logger.log_model_loaded(model.model_version(), model.kind());
            }
            ModelSlot::Unavailable(reason) => {
                self.metrics.clear_model_info();
                self.logger.log_model_unavailable(reason);
            }
        }
    }

    pub fn model_slot(&self) -> &ModelSlot {
        &self.model
    }

    pub fn decomposer(&self) -> &LoadDecomposer {
        &self.decomposer
    }

    /// Version and kind of the loaded model, if any
    pub fn model_info(&self) -> Option<(String, EstimatorKind)> {
        match &self.model {
            ModelSlot::Loaded(model) => Some((model.model_version().to_string(), model.kind())),
            ModelSlot::Unavailable(_) => None,
        }
    }

    /// Run inference on validated parameters
    pub fn infer(&self, params: &ParameterSet) -> Result<EnergyEstimate, InferenceError> {
        let start = Instant::now();
        let mut stage = InferenceStage::Idle;

        match self.run(params, &mut stage) {
            Ok(estimate) => {
                let elapsed = start.elapsed();
                self.metrics.observe_prediction_latency(elapsed.as_secs_f64());
                self.metrics.inc_predictions(estimate.estimator());
                self.logger.log_prediction(&estimate, elapsed.as_micros());
                Ok(estimate)
            }
            Err(err) => {
                self.metrics.inc_inference_errors(err.reason(), stage);
                self.logger.log_inference_failure(&err, stage);
                Err(err)
            }
        }
    }

    /// Validate raw input, recording rejections
    pub fn validate(&self, raw: &RawParameters) -> Result<ParameterSet, ValidationError> {
        debug!(stage = InferenceStage::Validating.as_str(), "Validating parameters");
        ParameterSet::construct(raw).map_err(|err| {
            self.metrics.inc_validation_errors(err.field);
            self.logger.log_validation_failure(&err);
            err
        })
    }

    /// Validate raw input, then run inference
    pub fn infer_raw(&self, raw: &RawParameters) -> Result<EnergyEstimate, EstimateError> {
        let params = self.validate(raw)?;
        Ok(self.infer(&params)?)
    }

    /// `stage` is left at the step that failed
    fn run(&self, params: &ParameterSet, stage: &mut InferenceStage) -> Result<EnergyEstimate, InferenceError> {
        *stage = InferenceStage::Predicting;
        let model = self.model.model()?;
        let row = params.to_feature_vector();
        let predicted_value = model.predict(&[row])?.into_single()?;

        *stage = InferenceStage::Decomposing;
        let breakdown = self.decomposer.decompose(predicted_value)?;

        *stage = InferenceStage::Done;
        debug!(
            stage = stage.as_str(),
            predicted_value = predicted_value,
            "Inference completed"
        );
        Ok(EnergyEstimate::new(
            predicted_value,
            breakdown,
            model.kind(),
            model.model_version(),
        ))
    }
}
