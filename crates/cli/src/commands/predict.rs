//! Energy prediction command

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use energy_core::{
    load_model, ChartData, DecomposerConfig, ImpactWeights, InferenceService, LoadDecomposer,
    ModelConfig, ModelSlot, RawParameters,
};
use tabled::Tabled;

use crate::client::{ApiClient, PredictionResponse};
use crate::output::{
    bar, color_tier, format_energy, format_percent, print_heading, print_info, print_json,
    print_warning, render_table, OutputFormat,
};

/// Row for the feature impact table
#[derive(Tabled)]
struct ImpactRow {
    #[tabled(rename = "Parameter")]
    parameter: String,
    #[tabled(rename = "Weight")]
    weight: String,
    #[tabled(rename = "Position in range")]
    position: String,
    #[tabled(rename = "Impact")]
    impact: String,
}

/// Ask the server for a prediction
pub async fn predict_remote(client: &ApiClient, raw: &RawParameters, format: OutputFormat) -> Result<()> {
    let result = client.predict(raw).await?;
    render(&result, format)
}

/// Load the model in-process and run one prediction
pub fn predict_local(
    model_config: &ModelConfig,
    decomposer: DecomposerConfig,
    raw: &RawParameters,
    format: OutputFormat,
) -> Result<()> {
    let result = run_local(model_config, decomposer, raw)?;
    render(&result, format)
}

fn run_local(
    model_config: &ModelConfig,
    decomposer: DecomposerConfig,
    raw: &RawParameters,
) -> Result<PredictionResponse> {
    let model = load_model(model_config).context("Failed to load model")?;
    let decomposer = LoadDecomposer::with_config(decomposer)?;
    let service = InferenceService::new(ModelSlot::from(model), decomposer);

    let params = service.validate(raw)?;
    let estimate = service.infer(&params)?;
    let chart = ChartData::from_estimate(&params, &estimate, &ImpactWeights::default());

    Ok(PredictionResponse {
        estimate,
        chart,
        generated_at: Utc::now(),
    })
}

fn render(result: &PredictionResponse, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(result)?,
        OutputFormat::Table => {
            let estimate = &result.estimate;

            print_heading("Energy Estimate", 60);
            println!(
                "Predicted consumption:  {}",
                format_energy(estimate.predicted_value()).cyan()
            );
            println!("Cooling load:           {}", format_energy(estimate.cooling_load()));
            println!("Heating load:           {}", format_energy(estimate.heating_load()));
            println!(
                "Efficiency tier:        {} ({})",
                color_tier(estimate.efficiency_tier()),
                estimate.efficiency_tier().description()
            );
            println!(
                "Model:                  {} ({})",
                estimate.model_version(),
                estimate.estimator()
            );
            println!();

            if estimate.is_placeholder() {
                print_warning("Placeholder estimate: not derived from a trained model");
                println!();
            }

            println!("{}", "Load Breakdown".bold());
            println!("{}", "-".repeat(60));
            let total = estimate.predicted_value();
            for point in &result.chart.load_breakdown {
                let share = if total != 0.0 { point.value / total } else { 0.0 };
                println!(
                    "{:<8} {} {}",
                    point.label,
                    bar(share, 30),
                    format_energy(point.value)
                );
            }
            println!();

            let rows: Vec<ImpactRow> = result
                .chart
                .feature_impacts
                .iter()
                .map(|impact| ImpactRow {
                    parameter: impact.label.clone(),
                    weight: format!("{:.2}", impact.weight),
                    position: format!("{} {}", bar(impact.position, 10), format_percent(impact.position)),
                    impact: format!("{:.3}", impact.score),
                })
                .collect();

            println!("{}", "Feature Impact".bold());
            println!("{}", render_table(rows));
            print_info("Impact weights are illustrative, not derived from the model");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use energy_core::{EfficiencyTier, EstimatorKind, Feature, ModelFormat, TierScheme};
    use std::io::Write;

    fn height_model_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{"version": "cli-test", "coefficients": [0, 0, 0, 0, 5, 0, 0, 0], "intercept": 0}"#)
            .unwrap();
        file
    }

    #[test]
    fn test_local_prediction_from_json_artifact() {
        let file = height_model_file();
        let mut raw = RawParameters::default();
        raw.set(Feature::OverallHeight, 3.0);

        let result = run_local(
            &ModelConfig::from_path(file.path()),
            DecomposerConfig::default(),
            &raw,
        )
        .unwrap();

        assert_eq!(result.estimate.predicted_value(), 15.0);
        assert_eq!(result.estimate.efficiency_tier(), EfficiencyTier::Excellent);
        assert_eq!(result.estimate.model_version(), "cli-test");
        assert_eq!(result.estimate.estimator(), EstimatorKind::Model);
    }

    #[test]
    fn test_local_prediction_uses_tier_scheme() {
        let file = height_model_file();
        let mut raw = RawParameters::default();
        raw.set(Feature::OverallHeight, 4.4);

        let decomposer = DecomposerConfig {
            tier_scheme: TierScheme::Relaxed,
            ..Default::default()
        };
        let result = run_local(&ModelConfig::from_path(file.path()), decomposer, &raw).unwrap();

        // 22.0 is GOOD under the standard scheme
        assert_eq!(result.estimate.efficiency_tier(), EfficiencyTier::Excellent);
    }

    #[test]
    fn test_local_validation_error_names_field() {
        let mut raw = RawParameters::default();
        raw.set(Feature::Orientation, 7.0);

        let config = ModelConfig {
            format: ModelFormat::Placeholder,
            ..Default::default()
        };
        let err = run_local(&config, DecomposerConfig::default(), &raw).unwrap_err();
        assert!(err.to_string().contains("orientation"));
    }

    #[test]
    fn test_missing_artifact_is_an_error() {
        let err = run_local(
            &ModelConfig::from_path("/nonexistent/model.json"),
            DecomposerConfig::default(),
            &RawParameters::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to load model"));
    }
}
