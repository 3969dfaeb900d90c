//! Server health command

use anyhow::Result;
use chrono::{TimeZone, Utc};
use energy_core::ComponentStatus;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{color_status, print_heading, print_json, print_success, print_warning, render_table, OutputFormat};

/// Row for the component health table
#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Last Check")]
    last_check: String,
}

fn status_str(status: ComponentStatus) -> &'static str {
    match status {
        ComponentStatus::Healthy => "healthy",
        ComponentStatus::Degraded => "degraded",
        ComponentStatus::Unhealthy => "unhealthy",
    }
}

/// Show server health and per-component status
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let (_, health) = client.health().await?;

    match format {
        OutputFormat::Json => print_json(&health)?,
        OutputFormat::Table => {
            print_heading("Server Health", 50);
            println!("Status: {}", color_status(status_str(health.status)));
            println!();

            let mut components: Vec<_> = health.components.iter().collect();
            components.sort_by(|a, b| a.0.cmp(b.0));

            let rows: Vec<ComponentRow> = components
                .into_iter()
                .map(|(name, component)| ComponentRow {
                    name: name.clone(),
                    status: color_status(status_str(component.status)),
                    message: component.message.clone().unwrap_or_else(|| "-".to_string()),
                    last_check: Utc
                        .timestamp_opt(component.last_check_timestamp, 0)
                        .single()
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_else(|| "-".to_string()),
                })
                .collect();
            println!("{}", render_table(rows));

            match health.status {
                ComponentStatus::Healthy => print_success("Server is healthy"),
                ComponentStatus::Degraded => print_warning("Server is operational with caveats"),
                ComponentStatus::Unhealthy => print_warning("Server cannot serve predictions"),
            }
        }
    }

    Ok(())
}
