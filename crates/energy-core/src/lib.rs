//! Building energy-consumption inference core
//!
//! This crate provides:
//! - Validation of the eight building design parameters
//! - Pluggable predictive model backends (JSON linear model, ONNX)
//! - Cooling/heating load decomposition and efficiency tiers
//! - Chart-ready aggregation, health checks and observability

pub mod chart;
pub mod decompose;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod params;
pub mod predictor;
pub mod service;

pub use chart::{ChartData, ImpactWeights};
pub use decompose::{DecomposerConfig, EfficiencyTier, LoadDecomposer, TierScheme};
pub use error::{EstimateError, InferenceError, ModelLoadError, ValidationError};
pub use health::{ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse};
pub use models::{EnergyEstimate, EstimatorKind};
pub use observability::{PredictorMetrics, StructuredLogger};
pub use params::{Feature, FieldSpec, ParameterSet, RawParameters, FIELD_SPECS};
pub use predictor::{load_model, ModelConfig, ModelFormat, ModelSlot, PredictiveModel};
pub use service::{InferenceService, InferenceStage};
