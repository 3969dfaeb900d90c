//! Building Energy Predictor CLI
//!
//! Estimates a building's energy consumption from its design parameters,
//! either with a local model artifact or through a running server.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use commands::{health, params, predict};
use energy_core::{DecomposerConfig, Feature, ModelConfig, ModelFormat, RawParameters, TierScheme};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Building Energy Predictor CLI
#[derive(Parser)]
#[command(name = "energy")]
#[command(author, version, about = "CLI for the Building Energy Predictor", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate energy consumption for a building design
    Predict(PredictArgs),

    /// List design parameters with their ranges and defaults
    Params {
        /// Fetch the parameter table from a server instead
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Show server health
    Health {
        /// Server URL (can also be set via ENERGY_API_URL env var)
        #[arg(long, env = "ENERGY_API_URL", default_value = "http://localhost:8080")]
        api_url: String,
    },
}

#[derive(Args)]
pub struct PredictArgs {
    /// Relative compactness [0.62, 0.98]
    #[arg(long)]
    pub relative_compactness: Option<f64>,

    /// Surface area in m² [514, 808]
    #[arg(long)]
    pub surface_area: Option<f64>,

    /// Wall area in m² [294, 416]
    #[arg(long)]
    pub wall_area: Option<f64>,

    /// Roof area in m² [110, 220]
    #[arg(long)]
    pub roof_area: Option<f64>,

    /// Overall height in m [3, 7]
    #[arg(long)]
    pub overall_height: Option<f64>,

    /// Orientation code [2, 5]
    #[arg(long)]
    pub orientation: Option<f64>,

    /// Glazing area fraction [0, 0.4]
    #[arg(long)]
    pub glazing_area: Option<f64>,

    /// Glazing area distribution code [0, 5]
    #[arg(long)]
    pub glazing_area_distribution: Option<f64>,

    /// Local model artifact (.json or .onnx)
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Expected hex SHA-256 of the model artifact
    #[arg(long)]
    pub sha256: Option<String>,

    /// Use the placeholder estimator; results are flagged as not model-derived
    #[arg(long)]
    pub placeholder: bool,

    /// Efficiency tier thresholds for local predictions [default: standard]
    #[arg(long, value_enum)]
    pub tier_scheme: Option<TierSchemeArg>,

    /// Predict through a server (can also be set via ENERGY_API_URL env var)
    #[arg(long, env = "ENERGY_API_URL")]
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TierSchemeArg {
    /// EXCELLENT below 20, GOOD below 35
    Standard,
    /// EXCELLENT below 25, GOOD below 50
    Relaxed,
}

impl From<TierSchemeArg> for TierScheme {
    fn from(arg: TierSchemeArg) -> Self {
        match arg {
            TierSchemeArg::Standard => TierScheme::Standard,
            TierSchemeArg::Relaxed => TierScheme::Relaxed,
        }
    }
}

impl PredictArgs {
    fn raw_parameters(&self) -> RawParameters {
        let values = [
            (Feature::RelativeCompactness, self.relative_compactness),
            (Feature::SurfaceArea, self.surface_area),
            (Feature::WallArea, self.wall_area),
            (Feature::RoofArea, self.roof_area),
            (Feature::OverallHeight, self.overall_height),
            (Feature::Orientation, self.orientation),
            (Feature::GlazingArea, self.glazing_area),
            (Feature::GlazingAreaDistribution, self.glazing_area_distribution),
        ];

        let mut raw = RawParameters::default();
        for (feature, value) in values {
            if let Some(value) = value {
                raw.set(feature, value);
            }
        }
        raw
    }

    fn model_config(&self, config: &config::Config) -> ModelConfig {
        if self.placeholder {
            return ModelConfig {
                format: ModelFormat::Placeholder,
                ..Default::default()
            };
        }

        let mut model_config = ModelConfig::from_path(self.model.clone().unwrap_or_else(|| config.model_path()));
        model_config.sha256 = self.sha256.clone().or_else(|| config.model_sha256.clone());
        model_config
    }

    /// Server to use, unless a local model was asked for explicitly
    fn remote_url(&self, config: &config::Config) -> Option<String> {
        if self.model.is_some() || self.placeholder {
            return None;
        }
        self.api_url.clone().or_else(|| config.api_url.clone())
    }

    /// The server applies its own model and tier scheme
    fn check_remote(&self) -> Result<()> {
        if self.tier_scheme.is_some() {
            anyhow::bail!("--tier-scheme only applies to local predictions; the server uses its configured scheme");
        }
        if self.sha256.is_some() {
            anyhow::bail!("--sha256 only applies to local predictions; pass --model to verify an artifact");
        }
        Ok(())
    }

    fn decomposer_config(&self) -> DecomposerConfig {
        DecomposerConfig {
            tier_scheme: self.tier_scheme.map(TierScheme::from).unwrap_or_default(),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
            .with_writer(std::io::stderr)
            .init();
    }

    let config = config::Config::load()?;

    // Execute command
    match cli.command {
        Commands::Predict(args) => {
            let raw = args.raw_parameters();
            match args.remote_url(&config) {
                Some(url) => {
                    args.check_remote()?;
                    let client = client::ApiClient::new(&url)?;
                    predict::predict_remote(&client, &raw, cli.format).await?;
                }
                None => {
                    predict::predict_local(&args.model_config(&config), args.decomposer_config(), &raw, cli.format)?;
                }
            }
        }
        Commands::Params { api_url } => {
            let client = api_url.as_deref().map(client::ApiClient::new).transpose()?;
            params::show_params(client.as_ref(), cli.format).await?;
        }
        Commands::Health { api_url } => {
            let client = client::ApiClient::new(&api_url)?;
            health::show_health(&client, cli.format).await?;
        }
    }

    Ok(())
}
