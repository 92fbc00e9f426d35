//! Dashboard and maintenance-window commands

use crate::output::{self, OutputFormat};
use anyhow::Result;
use maintenance_engine::{MaintenanceEngine, PendingMaintenance};
use serde::Serialize;
use tabled::Tabled;

#[derive(Tabled, Serialize)]
struct PendingRow {
    #[tabled(rename = "Room")]
    room_number: i64,
    #[tabled(rename = "ID")]
    device_id: usize,
    #[tabled(rename = "Device")]
    device_name: String,
    #[tabled(rename = "Due Date")]
    maintenance_date: String,
}

impl From<&PendingMaintenance> for PendingRow {
    fn from(pending: &PendingMaintenance) -> Self {
        Self {
            room_number: pending.room_number,
            device_id: pending.device_id,
            device_name: pending.device_name.clone(),
            maintenance_date: pending.maintenance_date.format("%Y-%m-%d").to_string(),
        }
    }
}

pub fn dashboard(engine: &MaintenanceEngine, format: OutputFormat) -> Result<()> {
    let stats = engine.dashboard()?;

    match format {
        OutputFormat::Table => {
            println!("  Total devices:     {}", stats.total_devices);
            println!("  Running:           {}", stats.running);
            println!("  Down:              {}", stats.down);
            println!("  Due maintenance:   {}", stats.due_maintenance);
            println!("  Under maintenance: {}", stats.under_maintenance);
            if let Some(file) = &stats.loaded_data_file {
                println!("  Loaded data file:  {file}");
            }
            if !stats.pending_maintenance.is_empty() {
                println!();
                let rows: Vec<PendingRow> =
                    stats.pending_maintenance.iter().map(PendingRow::from).collect();
                output::print_table(&rows, OutputFormat::Table);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}

pub fn upcoming(engine: &MaintenanceEngine, format: OutputFormat) -> Result<()> {
    let devices = engine.upcoming_maintenance()?;
    if devices.is_empty() {
        output::print_info("No devices with upcoming maintenance");
        return Ok(());
    }
    output::print_predictions(&devices, format);
    Ok(())
}

pub fn weekly(engine: &MaintenanceEngine, format: OutputFormat) -> Result<()> {
    let devices = engine.weekly_maintenance()?;
    if devices.is_empty() {
        output::print_info("No devices due this week");
        return Ok(());
    }
    output::print_predictions(&devices, format);
    Ok(())
}
