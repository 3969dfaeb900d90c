//! Core data models for energy estimation

use crate::decompose::{EfficiencyTier, LoadBreakdown};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What produced a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimatorKind {
    /// A trained regression model
    Model,
    /// Explicitly configured demo estimator, not model-derived
    Placeholder,
}

impl EstimatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstimatorKind::Model => "model",
            EstimatorKind::Placeholder => "placeholder",
        }
    }
}

impl fmt::Display for EstimatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one successful inference
///
/// Created once per call and never mutated. `cooling_load` and
/// `heating_load` come from a fixed heuristic split of `predicted_value`,
/// not from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyEstimate {
    predicted_value: f64,
    cooling_load: f64,
    heating_load: f64,
    efficiency_tier: EfficiencyTier,
    estimator: EstimatorKind,
    model_version: String,
}

impl EnergyEstimate {
    pub(crate) fn new(
        predicted_value: f64,
        breakdown: LoadBreakdown,
        estimator: EstimatorKind,
        model_version: impl Into<String>,
    ) -> Self {
        Self {
            predicted_value,
            cooling_load: breakdown.cooling_load,
            heating_load: breakdown.heating_load,
            efficiency_tier: breakdown.efficiency_tier,
            estimator,
            model_version: model_version.into(),
        }
    }

    /// Predicted energy consumption in kWh/m²
    pub fn predicted_value(&self) -> f64 {
        self.predicted_value
    }

    pub fn cooling_load(&self) -> f64 {
        self.cooling_load
    }

    pub fn heating_load(&self) -> f64 {
        self.heating_load
    }

    pub fn efficiency_tier(&self) -> EfficiencyTier {
        self.efficiency_tier
    }

    pub fn estimator(&self) -> EstimatorKind {
        self.estimator
    }

    /// True when the value did not come from a trained model
    pub fn is_placeholder(&self) -> bool {
        self.estimator == EstimatorKind::Placeholder
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }
}
