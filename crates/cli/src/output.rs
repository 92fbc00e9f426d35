//! Output formatting utilities

use chrono::NaiveDate;
use clap::ValueEnum;
use colored::Colorize;
use maintenance_engine::DevicePrediction;
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

/// Print a table from a list of items
pub fn print_table<T: Tabled + Serialize>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("{}", "No items found".yellow());
                return;
            }
            let table = Table::new(items).with(Style::rounded()).to_string();
            println!("{}", table);
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(&items) {
                println!("{}", json);
            }
        }
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
#[allow(dead_code)]
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format an optional date the way the API rendered it
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "N/A".to_string(), |d| d.format("%Y-%m-%d").to_string())
}

/// Format an optional year
pub fn format_year(year: Option<i32>) -> String {
    year.map_or_else(|| "N/A".to_string(), |y| y.to_string())
}

/// Format a yes/no flag with color
pub fn format_yes_no(value: bool) -> String {
    if value {
        "yes".green().to_string()
    } else {
        "no".red().to_string()
    }
}

/// Color status text by its reported condition
pub fn color_status(status: &str) -> String {
    let lowered = status.to_lowercase();
    if lowered.contains("working") || lowered == "none" {
        status.green().to_string()
    } else if lowered == "unknown" {
        status.yellow().to_string()
    } else {
        status.red().to_string()
    }
}

/// One prediction row rendered for table output
#[derive(Tabled, Serialize)]
pub struct PredictionRow {
    #[tabled(rename = "ID")]
    pub device_id: usize,
    #[tabled(rename = "Room")]
    pub room_number: i64,
    #[tabled(rename = "Device")]
    pub device_name: String,
    #[tabled(rename = "Issue")]
    pub issue_reported: String,
    #[tabled(rename = "Year")]
    pub device_year: String,
    #[tabled(rename = "Warranty")]
    pub under_warranty: String,
    #[tabled(rename = "Warranty Until")]
    pub warranty_year: String,
    #[tabled(rename = "Last Maintained")]
    pub previous_maintenance_date: String,
    #[tabled(rename = "Predicted Days")]
    pub predicted_days: String,
    #[tabled(rename = "Next Maintenance")]
    pub next_maintenance_date: String,
}

impl From<&DevicePrediction> for PredictionRow {
    fn from(prediction: &DevicePrediction) -> Self {
        Self {
            device_id: prediction.device_id,
            room_number: prediction.room_number,
            device_name: prediction.device_name.clone(),
            issue_reported: color_status(&prediction.issue_reported),
            device_year: format_year(prediction.device_year),
            under_warranty: format_yes_no(prediction.under_warranty),
            warranty_year: format_year(prediction.warranty_year),
            previous_maintenance_date: format_date(prediction.previous_maintenance_date),
            predicted_days: format!("{:.2}", prediction.predicted_days_since_maintenance),
            next_maintenance_date: format_date(prediction.next_maintenance_date),
        }
    }
}

/// Print a prediction list in the requested format. JSON output carries
/// the raw typed predictions, not the table rendering.
pub fn print_predictions(predictions: &[DevicePrediction], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let rows: Vec<PredictionRow> = predictions.iter().map(PredictionRow::from).collect();
            print_table(&rows, OutputFormat::Table);
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(predictions) {
                println!("{}", json);
            }
        }
    }
}
