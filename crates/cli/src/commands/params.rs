//! Parameter listing command

use anyhow::Result;
use tabled::Tabled;

use crate::client::{ApiClient, FieldSpecView};
use crate::output::{print_heading, print_json, render_table, OutputFormat};

/// Row for the parameters table
#[derive(Tabled)]
struct ParamRow {
    #[tabled(rename = "Flag")]
    flag: String,
    #[tabled(rename = "Parameter")]
    label: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Range")]
    range: String,
    #[tabled(rename = "Default")]
    default: String,
}

impl From<&FieldSpecView> for ParamRow {
    fn from(field: &FieldSpecView) -> Self {
        let unit = if field.unit.is_empty() {
            String::new()
        } else {
            format!(" {}", field.unit)
        };
        Self {
            flag: format!("--{}", field.name.replace('_', "-")),
            label: field.label.clone(),
            kind: field.kind.clone(),
            range: format!("[{}, {}]{}", field.range.min, field.range.max, unit),
            default: field.default.to_string(),
        }
    }
}

/// List the design parameters, from the server when a client is given
pub async fn show_params(client: Option<&ApiClient>, format: OutputFormat) -> Result<()> {
    let fields = match client {
        Some(client) => client.parameters().await?,
        None => energy_core::FIELD_SPECS.iter().map(FieldSpecView::from).collect(),
    };

    match format {
        OutputFormat::Json => print_json(&fields)?,
        OutputFormat::Table => {
            print_heading("Building Design Parameters", 60);
            let rows: Vec<ParamRow> = fields.iter().map(ParamRow::from).collect();
            println!("{}", render_table(rows));
        }
    }

    Ok(())
}
