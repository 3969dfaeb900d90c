//! Prediction post-processing
//!
//! Splits a scalar energy prediction into cooling and heating shares and
//! buckets it into an efficiency tier. The split ratio is a fixed heuristic
//! constant; it is not a model output.

use crate::error::{ConfigError, InferenceError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Share of the prediction attributed to cooling (heuristic, not model-derived)
pub const COOLING_SHARE: f64 = 0.6;

/// Qualitative efficiency bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EfficiencyTier {
    Excellent,
    Good,
    High,
}

impl EfficiencyTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            EfficiencyTier::Excellent => "EXCELLENT",
            EfficiencyTier::Good => "GOOD",
            EfficiencyTier::High => "HIGH",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EfficiencyTier::Excellent => "Excellent energy efficiency",
            EfficiencyTier::Good => "Good energy efficiency",
            EfficiencyTier::High => "High energy consumption",
        }
    }
}

impl fmt::Display for EfficiencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threshold scheme for efficiency tiers
///
/// Two schemes exist in the field; exactly one is active per service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierScheme {
    /// EXCELLENT below 20, GOOD below 35
    #[default]
    Standard,
    /// EXCELLENT below 25, GOOD below 50
    Relaxed,
}

impl TierScheme {
    /// `(excellent_below, good_below)` in kWh/m²
    pub fn thresholds(&self) -> (f64, f64) {
        match self {
            TierScheme::Standard => (20.0, 35.0),
            TierScheme::Relaxed => (25.0, 50.0),
        }
    }

    pub fn classify(&self, predicted_value: f64) -> EfficiencyTier {
        let (excellent_below, good_below) = self.thresholds();
        if predicted_value < excellent_below {
            EfficiencyTier::Excellent
        } else if predicted_value < good_below {
            EfficiencyTier::Good
        } else {
            EfficiencyTier::High
        }
    }
}

/// Configuration for load decomposition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecomposerConfig {
    /// Cooling share of the predicted value; heating gets the remainder
    #[serde(default = "default_cooling_share")]
    pub cooling_share: f64,
    #[serde(default)]
    pub tier_scheme: TierScheme,
}

fn default_cooling_share() -> f64 {
    COOLING_SHARE
}

impl Default for DecomposerConfig {
    fn default() -> Self {
        Self {
            cooling_share: COOLING_SHARE,
            tier_scheme: TierScheme::default(),
        }
    }
}

impl DecomposerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.cooling_share) {
            return Err(ConfigError::CoolingShareOutOfRange(self.cooling_share));
        }
        Ok(())
    }
}

/// Secondary metrics derived from one prediction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadBreakdown {
    pub cooling_load: f64,
    pub heating_load: f64,
    pub efficiency_tier: EfficiencyTier,
}

/// Derives cooling/heating loads and efficiency tier from a prediction
#[derive(Debug, Clone)]
pub struct LoadDecomposer {
    config: DecomposerConfig,
}

impl LoadDecomposer {
    pub fn new() -> Self {
        Self {
            config: DecomposerConfig::default(),
        }
    }

    pub fn with_config(config: DecomposerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DecomposerConfig {
        &self.config
    }

    pub fn decompose(&self, predicted_value: f64) -> Result<LoadBreakdown, InferenceError> {
        if !predicted_value.is_finite() {
            return Err(InferenceError::InvalidPredictionValue(predicted_value));
        }

        let cooling_load = predicted_value * self.config.cooling_share;
        // Remainder keeps cooling + heating == predicted_value
        let heating_load = predicted_value - cooling_load;

        Ok(LoadBreakdown {
            cooling_load,
            heating_load,
            efficiency_tier: self.config.tier_scheme.classify(predicted_value),
        })
    }
}

impl Default for LoadDecomposer {
    fn default() -> Self {
        Self::new()
    }
}
