//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use energy_core::EfficiencyTier;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Render rows as a rounded table
pub fn render_table<T: Tabled>(rows: Vec<T>) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Print a section heading with an underline
pub fn print_heading(title: &str, width: usize) {
    println!("{}", title.bold());
    println!("{}", "=".repeat(width));
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format an energy value in kWh/m²
pub fn format_energy(value: f64) -> String {
    format!("{:.2} kWh/m²", value)
}

/// Format a 0..1 fraction as a percentage
pub fn format_percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

/// Fixed-width bar for a 0..1 fraction
pub fn bar(fraction: f64, width: usize) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Color status based on value
pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "healthy" | "ready" => status.green().to_string(),
        "degraded" => status.yellow().to_string(),
        "unhealthy" | "not ready" => status.red().to_string(),
        _ => status.to_string(),
    }
}

/// Color an efficiency tier
pub fn color_tier(tier: EfficiencyTier) -> String {
    match tier {
        EfficiencyTier::Excellent => tier.as_str().green().bold().to_string(),
        EfficiencyTier::Good => tier.as_str().yellow().bold().to_string(),
        EfficiencyTier::High => tier.as_str().red().bold().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_width_is_fixed() {
        assert_eq!(bar(0.0, 10).chars().count(), 10);
        assert_eq!(bar(0.5, 10), "█████░░░░░");
        assert_eq!(bar(1.5, 4), "████");
    }

    #[test]
    fn test_format_energy() {
        assert_eq!(format_energy(22.204), "22.20 kWh/m²");
        assert_eq!(format_percent(0.6), "60%");
    }
}
