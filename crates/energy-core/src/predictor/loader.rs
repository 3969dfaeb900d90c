//! One-time model artifact loading
//!
//! Reads the artifact named by configuration, optionally verifies its
//! SHA-256 checksum, and builds the matching backend. Runs once at process
//! start; the resulting model is shared read-only afterwards.

use super::{LinearModel, OnnxModel, PlaceholderEstimator, PredictiveModel, DEFAULT_PLACEHOLDER_VALUE};
use crate::error::ModelLoadError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Artifact format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    /// Pick from the file extension
    #[default]
    Auto,
    Json,
    Onnx,
    /// Demo estimator; no artifact is read
    Placeholder,
}

/// Configuration for model loading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the model artifact
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub format: ModelFormat,
    /// Expected hex SHA-256 of the artifact
    #[serde(default)]
    pub sha256: Option<String>,
    /// Version label for artifacts that carry none (ONNX)
    #[serde(default)]
    pub version: Option<String>,
    /// Value returned by the placeholder estimator
    #[serde(default = "default_placeholder_value")]
    pub placeholder_value: f64,
}

fn default_placeholder_value() -> f64 {
    DEFAULT_PLACEHOLDER_VALUE
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: None,
            format: ModelFormat::Auto,
            sha256: None,
            version: None,
            placeholder_value: DEFAULT_PLACEHOLDER_VALUE,
        }
    }
}

impl ModelConfig {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Format to load, resolving `Auto` from the file extension
    pub fn resolved_format(&self) -> Result<ModelFormat, ModelLoadError> {
        match self.format {
            ModelFormat::Auto => {
                let path = self.path.as_deref().ok_or(ModelLoadError::MissingPath)?;
                match path.extension().and_then(|e| e.to_str()) {
                    Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(ModelFormat::Json),
                    Some(ext) if ext.eq_ignore_ascii_case("onnx") => Ok(ModelFormat::Onnx),
                    _ => Err(ModelLoadError::UnknownFormat(path.display().to_string())),
                }
            }
            format => Ok(format),
        }
    }
}

/// Load the configured model
pub fn load_model(config: &ModelConfig) -> Result<Arc<dyn PredictiveModel>, ModelLoadError> {
    let format = config.resolved_format()?;

    if format == ModelFormat::Placeholder {
        warn!(
            value = config.placeholder_value,
            "Using placeholder estimator, predictions are not model-derived"
        );
        return Ok(Arc::new(PlaceholderEstimator::new(config.placeholder_value)));
    }

    let path = config.path.as_deref().ok_or(ModelLoadError::MissingPath)?;
    let bytes = read_artifact(path)?;

    if let Some(expected) = &config.sha256 {
        verify_checksum(&bytes, expected)?;
        debug!(path = %path.display(), "Model checksum verified");
    }

    let model: Arc<dyn PredictiveModel> = match format {
        ModelFormat::Json => {
            let model = LinearModel::from_json(&bytes)?;
            match &config.version {
                Some(version) => Arc::new(model.with_version(version.clone())),
                None => Arc::new(model),
            }
        }
        ModelFormat::Onnx => {
            let version = config.version.clone().unwrap_or_else(|| "onnx".to_string());
            Arc::new(OnnxModel::new(&bytes, version)?)
        }
        ModelFormat::Auto | ModelFormat::Placeholder => {
            return Err(ModelLoadError::UnknownFormat(path.display().to_string()))
        }
    };

    info!(
        path = %path.display(),
        format = ?format,
        version = %model.model_version(),
        size_bytes = bytes.len(),
        "Model loaded"
    );
    Ok(model)
}

fn read_artifact(path: &Path) -> Result<Vec<u8>, ModelLoadError> {
    std::fs::read(path).map_err(|source| ModelLoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Compare the artifact's SHA-256 against the configured hex digest
fn verify_checksum(bytes: &[u8], expected: &str) -> Result<(), ModelLoadError> {
    let actual = hex::encode(Sha256::digest(bytes));
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(ModelLoadError::ChecksumMismatch {
            expected: expected.to_string(),
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EstimatorKind;
    use std::io::Write;

    const ARTIFACT: &str = r#"{"version": "lr-test", "coefficients": [0,0,0,0,2,0,0,0], "intercept": 1.0}"#;

    fn write_artifact(suffix: &str, contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    #[test]
    fn test_load_json_by_extension() {
        let file = write_artifact(".json", ARTIFACT.as_bytes());
        let model = load_model(&ModelConfig::from_path(file.path())).unwrap();
        assert_eq!(model.model_version(), "lr-test");
        assert_eq!(model.kind(), EstimatorKind::Model);
    }

    #[test]
    fn test_version_override() {
        let file = write_artifact(".json", ARTIFACT.as_bytes());
        let config = ModelConfig {
            version: Some("pinned".to_string()),
            ..ModelConfig::from_path(file.path())
        };
        assert_eq!(load_model(&config).unwrap().model_version(), "pinned");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let config = ModelConfig::from_path("/nonexistent/model.json");
        assert!(matches!(load_model(&config), Err(ModelLoadError::Io { .. })));
    }

    #[test]
    fn test_unknown_extension_requires_format() {
        let file = write_artifact(".joblib", ARTIFACT.as_bytes());
        let config = ModelConfig::from_path(file.path());
        assert!(matches!(load_model(&config), Err(ModelLoadError::UnknownFormat(_))));

        let config = ModelConfig {
            format: ModelFormat::Json,
            ..ModelConfig::from_path(file.path())
        };
        assert!(load_model(&config).is_ok());
    }

    #[test]
    fn test_missing_path() {
        assert!(matches!(
            load_model(&ModelConfig::default()),
            Err(ModelLoadError::MissingPath)
        ));
    }

    #[test]
    fn test_checksum_verified() {
        let file = write_artifact(".json", ARTIFACT.as_bytes());
        let digest = hex::encode(Sha256::digest(ARTIFACT.as_bytes()));

        let config = ModelConfig {
            sha256: Some(digest.to_uppercase()),
            ..ModelConfig::from_path(file.path())
        };
        assert!(load_model(&config).is_ok());

        let config = ModelConfig {
            sha256: Some("00".repeat(32)),
            ..ModelConfig::from_path(file.path())
        };
        assert!(matches!(
            load_model(&config),
            Err(ModelLoadError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_placeholder_needs_no_path() {
        let config = ModelConfig {
            format: ModelFormat::Placeholder,
            placeholder_value: 30.0,
            ..Default::default()
        };
        let model = load_model(&config).unwrap();
        assert_eq!(model.kind(), EstimatorKind::Placeholder);
    }

    #[test]
    fn test_format_deserialization() {
        let config: ModelConfig =
            serde_json::from_str(r#"{"path": "m.onnx", "format": "onnx"}"#).unwrap();
        assert_eq!(config.format, ModelFormat::Onnx);
        assert_eq!(config.placeholder_value, DEFAULT_PLACEHOLDER_VALUE);
    }
}
