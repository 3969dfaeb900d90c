//! Chart-ready aggregation of an estimate
//!
//! Feature impact weights are presentational placeholders with no
//! derivation from the model. They stay configurable.

use crate::error::ConfigError;
use crate::models::EnergyEstimate;
use crate::params::{Feature, ParameterSet, FEATURE_COUNT};
use serde::{Deserialize, Serialize};

/// Default impact weight per feature, in feature order
pub const DEFAULT_IMPACT_WEIGHTS: [f64; FEATURE_COUNT] = [0.30, 0.10, 0.15, 0.10, 0.20, 0.05, 0.08, 0.02];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImpactWeights([f64; FEATURE_COUNT]);

impl ImpactWeights {
    pub fn new(weights: [f64; FEATURE_COUNT]) -> Result<Self, ConfigError> {
        let weights = Self(weights);
        weights.validate()?;
        Ok(weights)
    }

    /// Weights must be finite and non-negative
    pub fn validate(&self) -> Result<(), ConfigError> {
        for feature in Feature::ALL {
            let value = self.get(feature);
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidImpactWeight {
                    field: feature.name(),
                    value,
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }
}

impl Default for ImpactWeights {
    fn default() -> Self {
        Self(DEFAULT_IMPACT_WEIGHTS)
    }
}

/// One labelled bar/slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImpact {
    pub field: String,
    pub label: String,
    pub weight: f64,
    /// Position of the value inside its range, 0 at min and 1 at max
    pub position: f64,
    pub score: f64,
}

/// Series a presentation layer can plot directly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub load_breakdown: Vec<ChartPoint>,
    pub feature_impacts: Vec<FeatureImpact>,
}

impl ChartData {
    pub fn from_estimate(params: &ParameterSet, estimate: &EnergyEstimate, weights: &ImpactWeights) -> Self {
        let load_breakdown = vec![
            ChartPoint {
                label: "Cooling".to_string(),
                value: estimate.cooling_load(),
            },
            ChartPoint {
                label: "Heating".to_string(),
                value: estimate.heating_load(),
            },
        ];

        let feature_impacts = Feature::ALL
            .iter()
            .map(|&feature| {
                let spec = feature.spec();
                let weight = weights.get(feature);
                let position = spec.range.position(params.get(feature));
                FeatureImpact {
                    field: spec.name.to_string(),
                    label: spec.label.to_string(),
                    weight,
                    position,
                    score: weight * position,
                }
            })
            .collect();

        Self {
            load_breakdown,
            feature_impacts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompose::LoadDecomposer;
    use crate::models::EstimatorKind;
    use crate::params::RawParameters;

    fn estimate(value: f64) -> EnergyEstimate {
        let breakdown = LoadDecomposer::new().decompose(value).unwrap();
        EnergyEstimate::new(value, breakdown, EstimatorKind::Model, "t")
    }

    #[test]
    fn test_load_breakdown_series() {
        let chart = ChartData::from_estimate(&ParameterSet::default(), &estimate(100.0), &ImpactWeights::default());
        assert_eq!(chart.load_breakdown.len(), 2);
        assert_eq!(chart.load_breakdown[0].label, "Cooling");
        assert_eq!(chart.load_breakdown[0].value, 60.0);
        assert_eq!(chart.load_breakdown[1].value, 40.0);
    }

    #[test]
    fn test_feature_impacts_follow_range_position() {
        let mut raw = RawParameters::default();
        raw.set(Feature::OverallHeight, 7.0).set(Feature::GlazingArea, 0.0);
        let params = ParameterSet::construct(&raw).unwrap();

        let chart = ChartData::from_estimate(&params, &estimate(30.0), &ImpactWeights::default());
        assert_eq!(chart.feature_impacts.len(), FEATURE_COUNT);

        let height = &chart.feature_impacts[Feature::OverallHeight.index()];
        assert_eq!(height.field, "overall_height");
        assert_eq!(height.position, 1.0);
        assert_eq!(height.score, 0.20);

        let glazing = &chart.feature_impacts[Feature::GlazingArea.index()];
        assert_eq!(glazing.score, 0.0);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut weights = DEFAULT_IMPACT_WEIGHTS;
        weights[3] = -0.1;
        assert!(matches!(
            ImpactWeights::new(weights),
            Err(ConfigError::InvalidImpactWeight { field: "roof_area", .. })
        ));
    }
}
