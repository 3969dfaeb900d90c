//! Observability infrastructure for the energy predictor
//!
//! Provides:
//! - Prometheus metrics (prediction latency, outcomes, model info)
//! - Structured JSON logging with tracing

use crate::error::{InferenceError, ValidationError};
use crate::models::{EnergyEstimate, EstimatorKind};
use crate::service::InferenceStage;
use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter_vec, GaugeVec, Histogram,
    IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for prediction latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PredictorMetricsInner> = OnceLock::new();

struct PredictorMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions: IntCounterVec,
    validation_errors: IntCounterVec,
    inference_errors: IntCounterVec,
    model_info: GaugeVec,
}

impl PredictorMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "energy_predictor_prediction_latency_seconds",
                "Time spent in model inference and post-processing",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions: register_int_counter_vec!(
                "energy_predictor_predictions_total",
                "Successful predictions by estimator kind",
                &["estimator"]
            )
            .expect("Failed to register predictions_total"),

            validation_errors: register_int_counter_vec!(
                "energy_predictor_validation_errors_total",
                "Rejected parameter sets by field",
                &["field"]
            )
            .expect("Failed to register validation_errors_total"),

            inference_errors: register_int_counter_vec!(
                "energy_predictor_inference_errors_total",
                "Failed inferences by reason and stage",
                &["reason", "stage"]
            )
            .expect("Failed to register inference_errors_total"),

            model_info: register_gauge_vec!(
                "energy_predictor_model_info",
                "Information about the loaded predictive model",
                &["version", "estimator"]
            )
            .expect("Failed to register model_info"),
        }
    }
}

/// Handle to the process-wide Prometheus metrics
///
/// Clones share the same underlying metrics.
#[derive(Clone)]
pub struct PredictorMetrics {
    _private: (),
}

impl Default for PredictorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PredictorMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PredictorMetrics")
    }
}

impl PredictorMetrics {
    /// Create a metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PredictorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PredictorMetricsInner {
        GLOBAL_METRICS.get_or_init(PredictorMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self, estimator: EstimatorKind) {
        self.inner()
            .predictions
            .with_label_values(&[estimator.as_str()])
            .inc();
    }

    pub fn inc_validation_errors(&self, field: &str) {
        self.inner().validation_errors.with_label_values(&[field]).inc();
    }

    pub fn inc_inference_errors(&self, reason: &str, stage: InferenceStage) {
        self.inner()
            .inference_errors
            .with_label_values(&[reason, stage.as_str()])
            .inc();
    }

    /// Update model info, replacing the previous labels
    pub fn set_model_info(&self, version: &str, estimator: EstimatorKind) {
        self.inner().model_info.reset();
        self.inner()
            .model_info
            .with_label_values(&[version, estimator.as_str()])
            .set(1.0);
    }

    pub fn clear_model_info(&self) {
        self.inner().model_info.reset();
    }
}

/// Structured logger for predictor events
///
/// Emits fixed-schema events so logs can be queried by `event`.
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn log_prediction(&self, estimate: &EnergyEstimate, elapsed_us: u128) {
        info!(
            event = "prediction_generated",
            service = %self.service,
            predicted_value = estimate.predicted_value(),
            cooling_load = estimate.cooling_load(),
            heating_load = estimate.heating_load(),
            efficiency_tier = %estimate.efficiency_tier(),
            estimator = %estimate.estimator(),
            model_version = %estimate.model_version(),
            elapsed_us = elapsed_us as u64,
            "Generated energy prediction"
        );
    }

    pub fn log_validation_failure(&self, error: &ValidationError) {
        info!(
            event = "validation_failed",
            service = %self.service,
            field = error.field,
            value = error.value,
            expected_range = %error.expected_range,
            kind = %error.kind,
            "Rejected building parameters"
        );
    }

    pub fn log_inference_failure(&self, error: &InferenceError, stage: InferenceStage) {
        warn!(
            event = "prediction_failed",
            service = %self.service,
            reason = error.reason(),
            stage = stage.as_str(),
            error = %error,
            "Inference failed"
        );
    }

    pub fn log_model_loaded(&self, version: &str, estimator: EstimatorKind) {
        info!(
            event = "model_loaded",
            service = %self.service,
            model_version = %version,
            estimator = %estimator,
            "Predictive model ready"
        );
    }

    pub fn log_model_unavailable(&self, reason: &str) {
        warn!(
            event = "model_unavailable",
            service = %self.service,
            reason = %reason,
            "No predictive model loaded, predictions will fail until restart"
        );
    }

    pub fn log_startup(&self, version: &str, model_version: &str) {
        info!(
            event = "service_started",
            service = %self.service,
            service_version = %version,
            model_version = %model_version,
            "Energy predictor started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service,
            reason = %reason,
            "Energy predictor shutting down"
        );
    }
}
