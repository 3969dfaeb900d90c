//! Linear-regression model loaded from a JSON artifact
//!
//! The artifact holds the fitted coefficients and intercept exported from
//! the training pipeline. A model fitted on a 2-D target exports them as a
//! single-row matrix and a one-element intercept; both layouts are accepted.

use super::{ModelOutput, PredictiveModel};
use crate::error::{InferenceError, ModelLoadError};
use crate::params::{Feature, FeatureVector, FEATURE_COUNT};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Coefficients as a flat vector or as a single-row matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coefficients {
    Flat(Vec<f64>),
    Rows(Vec<Vec<f64>>),
}

/// Intercept as a bare number or a one-element vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Intercept {
    Scalar(f64),
    Vector(Vec<f64>),
}

/// On-disk representation of a fitted linear model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearArtifact {
    #[serde(default)]
    pub version: Option<String>,
    /// Training column order; checked against the fixed feature order when present
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub coefficients: Coefficients,
    pub intercept: Intercept,
}

/// Fitted linear regression: `intercept + Σ coef_i · x_i`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    coefficients: FeatureVector,
    intercept: f64,
    version: String,
}

impl LinearModel {
    pub fn new(coefficients: FeatureVector, intercept: f64, version: impl Into<String>) -> Self {
        Self {
            coefficients,
            intercept,
            version: version.into(),
        }
    }

    /// Parse and check a JSON artifact
    pub fn from_json(bytes: &[u8]) -> Result<Self, ModelLoadError> {
        let artifact: LinearArtifact = serde_json::from_slice(bytes)?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: LinearArtifact) -> Result<Self, ModelLoadError> {
        if let Some(names) = &artifact.feature_names {
            check_feature_names(names)?;
        }

        let coefficients = match artifact.coefficients {
            Coefficients::Flat(values) => values,
            Coefficients::Rows(mut rows) => {
                if rows.len() != 1 {
                    return Err(ModelLoadError::InvalidArtifact(format!(
                        "expected a single target row of coefficients, got {}",
                        rows.len()
                    )));
                }
                rows.remove(0)
            }
        };
        let coefficients: FeatureVector = coefficients.try_into().map_err(|v: Vec<f64>| {
            ModelLoadError::InvalidArtifact(format!(
                "expected {} coefficients, got {}",
                FEATURE_COUNT,
                v.len()
            ))
        })?;

        let intercept = match artifact.intercept {
            Intercept::Scalar(value) => value,
            Intercept::Vector(values) => match values.as_slice() {
                [value] => *value,
                _ => {
                    return Err(ModelLoadError::InvalidArtifact(format!(
                        "expected a single intercept, got {}",
                        values.len()
                    )))
                }
            },
        };

        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelLoadError::InvalidArtifact(
                "coefficients and intercept must be finite".to_string(),
            ));
        }

        let version = artifact.version.unwrap_or_else(|| "unversioned".to_string());
        debug!(version = %version, intercept = intercept, "Parsed linear model artifact");
        Ok(Self::new(coefficients, intercept, version))
    }

    /// Replace the version label carried by the artifact
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn coefficients(&self) -> &FeatureVector {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    fn evaluate(&self, row: &FeatureVector) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row.iter())
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }
}

fn check_feature_names(names: &[String]) -> Result<(), ModelLoadError> {
    let expected: Vec<&str> = Feature::ALL.iter().map(|f| f.name()).collect();
    if names.len() != expected.len() || names.iter().zip(&expected).any(|(a, b)| a != b) {
        return Err(ModelLoadError::InvalidArtifact(format!(
            "feature order {:?} does not match expected {:?}",
            names, expected
        )));
    }
    Ok(())
}

impl PredictiveModel for LinearModel {
    fn predict(&self, rows: &[FeatureVector]) -> Result<ModelOutput, InferenceError> {
        Ok(ModelOutput::Batch(rows.iter().map(|row| self.evaluate(row)).collect()))
    }

    fn model_version(&self) -> &str {
        &self.version
    }
}
