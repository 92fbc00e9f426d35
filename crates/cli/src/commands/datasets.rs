//! Dataset selection, status and non-room asset commands

use crate::output::{self, OutputFormat};
use anyhow::Result;
use maintenance_engine::{EngineState, MaintenanceEngine, NonRoomAsset};
use serde::Serialize;
use tabled::Tabled;

pub fn select(engine: &MaintenanceEngine, name: &str, format: OutputFormat) -> Result<()> {
    let summary = engine.select_dataset(name)?;

    match format {
        OutputFormat::Table => {
            output::print_success(&format!(
                "Loaded '{}' ({} records, {} working devices)",
                summary.loaded_file, summary.records_loaded, summary.working_devices
            ));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

#[derive(Tabled, Serialize)]
struct AssetRow {
    #[tabled(rename = "Device ID")]
    device_id: String,
    #[tabled(rename = "Type")]
    device_type: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Year")]
    device_year: String,
    #[tabled(rename = "Warranty Until")]
    warranty_year: String,
    #[tabled(rename = "Usage Hours")]
    total_usage_hours: String,
    #[tabled(rename = "Last Maintained")]
    last_maintenance: String,
    #[tabled(rename = "Next Scheduled")]
    next_scheduled: String,
}

impl From<&NonRoomAsset> for AssetRow {
    fn from(asset: &NonRoomAsset) -> Self {
        Self {
            device_id: asset.device_id.clone(),
            device_type: asset.device_type.clone(),
            location: asset.location.clone(),
            device_year: output::format_year(asset.device_year),
            warranty_year: output::format_year(asset.warranty_year),
            total_usage_hours: asset
                .total_usage_hours
                .map_or_else(|| "N/A".to_string(), |hours| format!("{hours}")),
            last_maintenance: asset.last_maintenance_date.clone(),
            next_scheduled: asset.next_scheduled_maintenance_dates.clone(),
        }
    }
}

pub fn assets(engine: &MaintenanceEngine, format: OutputFormat) -> Result<()> {
    let assets = engine.non_room_assets()?;

    match format {
        OutputFormat::Table => {
            let rows: Vec<AssetRow> = assets.iter().map(AssetRow::from).collect();
            output::print_table(&rows, OutputFormat::Table);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&assets)?);
        }
    }

    Ok(())
}

pub fn status(engine: &MaintenanceEngine, format: OutputFormat) -> Result<()> {
    let status = engine.status();

    match format {
        OutputFormat::Table => {
            let state = match status.state {
                EngineState::Ready => "ready",
                EngineState::Loading => "loading",
                EngineState::TrainingInProgress => "training",
                EngineState::Uninitialized => "uninitialized",
            };
            output::print_info(&format!("Engine state: {state}"));
            println!(
                "  Model:   {}",
                if status.model_trained { "Trained" } else { "Not Trained" }
            );
            println!(
                "  Dataset: {} ({} records{})",
                if status.dataset_loaded { "Loaded" } else { "Not Loaded" },
                status.dataset_records,
                status
                    .loaded_data_file
                    .as_deref()
                    .map_or_else(String::new, |file| format!(", from {file}"))
            );
            match status.metrics {
                Some(metrics) => {
                    println!("  R-squared: {:.4}", metrics.r2_score);
                    println!("  MAE:       {:.4} days", metrics.mean_absolute_error);
                    println!("  RMSE:      {:.4} days", metrics.root_mean_squared_error);
                }
                None => println!("  Metrics:   N/A"),
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}
