//! Server configuration

use anyhow::{Context, Result};
use energy_core::{DecomposerConfig, ImpactWeights, ModelConfig};
use serde::Deserialize;
use std::path::Path;

/// Environment variable naming an optional config file
pub const CONFIG_FILE_ENV: &str = "ENERGY_CONFIG";

/// Model artifact looked up when nothing else is configured
pub const DEFAULT_MODEL_PATH: &str = "models/linear_regression_model.json";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Name attached to structured log events
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// API server port for prediction/health/metrics
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    #[serde(default)]
    pub model: ModelConfig,

    /// Cooling share and efficiency tier scheme
    #[serde(default)]
    pub decomposer: DecomposerConfig,

    /// Presentational feature impact weights, in feature order
    #[serde(default)]
    pub impact_weights: ImpactWeights,
}

fn default_service_name() -> String {
    "energy-server".to_string()
}

fn default_api_port() -> u16 {
    8080
}

impl ServerConfig {
    /// Load configuration from `ENERGY_CONFIG` (if set) and `ENERGY_*` variables
    pub fn load() -> Result<Self> {
        let file = std::env::var(CONFIG_FILE_ENV).ok();
        Self::build(file.as_deref().map(Path::new), Self::environment())
    }

    /// Load configuration from a file, still honouring environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::build(Some(path), Self::environment())
    }

    /// `ENERGY_API_PORT`, `ENERGY_MODEL__PATH`, ...: `_` after the prefix,
    /// `__` between nested keys
    fn environment() -> config::Environment {
        config::Environment::with_prefix("ENERGY")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn build(file: Option<&Path>, environment: config::Environment) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("model.path", DEFAULT_MODEL_PATH)
            .context("Failed to set config defaults")?;

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config: ServerConfig = builder
            .add_source(environment)
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.decomposer.validate().context("Invalid decomposer configuration")?;
        self.impact_weights.validate().context("Invalid impact weights")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use energy_core::{ModelFormat, TierScheme};
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_file_values_and_defaults() {
        let file = write_config(
            r#"
            api_port = 9191

            [model]
            format = "placeholder"

            [decomposer]
            tier_scheme = "relaxed"
            "#,
        );
        let config = ServerConfig::from_file(file.path()).unwrap();

        assert_eq!(config.api_port, 9191);
        assert_eq!(config.service_name, "energy-server");
        assert_eq!(config.model.format, ModelFormat::Placeholder);
        assert_eq!(config.model.path.as_deref(), Some(Path::new(DEFAULT_MODEL_PATH)));
        assert_eq!(config.decomposer.tier_scheme, TierScheme::Relaxed);
        assert_eq!(config.decomposer.cooling_share, 0.6);
        assert_eq!(config.impact_weights, ImpactWeights::default());
    }

    fn environment(vars: &[(&str, &str)]) -> config::Environment {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<config::Map<String, String>>();
        ServerConfig::environment().source(Some(vars))
    }

    #[test]
    fn test_environment_overrides() {
        let env = environment(&[
            ("ENERGY_API_PORT", "9191"),
            ("ENERGY_MODEL__PATH", "/opt/models/energy.onnx"),
            ("ENERGY_MODEL__FORMAT", "onnx"),
            ("ENERGY_DECOMPOSER__TIER_SCHEME", "relaxed"),
            ("ENERGY_DECOMPOSER__COOLING_SHARE", "0.7"),
        ]);
        let config = ServerConfig::build(None, env).unwrap();

        assert_eq!(config.api_port, 9191);
        assert_eq!(config.model.path.as_deref(), Some(Path::new("/opt/models/energy.onnx")));
        assert_eq!(config.model.format, ModelFormat::Onnx);
        assert_eq!(config.decomposer.tier_scheme, TierScheme::Relaxed);
        assert_eq!(config.decomposer.cooling_share, 0.7);
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = write_config("api_port = 9191\n");
        let config = ServerConfig::build(Some(file.path()), environment(&[("ENERGY_API_PORT", "7070")])).unwrap();
        assert_eq!(config.api_port, 7070);
    }

    #[test]
    fn test_unprefixed_variables_ignored() {
        let config = ServerConfig::build(None, environment(&[("API_PORT", "9191")])).unwrap();
        assert_eq!(config.api_port, 8080);
    }

    #[test]
    fn test_invalid_cooling_share_rejected() {
        let file = write_config(
            r#"
            [decomposer]
            cooling_share = 1.5
            "#,
        );
        assert!(ServerConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_negative_impact_weight_rejected() {
        let file = write_config("impact_weights = [0.3, 0.1, 0.15, -0.1, 0.2, 0.05, 0.08, 0.02]\n");
        assert!(ServerConfig::from_file(file.path()).is_err());
    }
}
