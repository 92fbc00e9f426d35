//! Per-room and per-device prediction commands

use crate::output::{self, OutputFormat};
use anyhow::Result;
use maintenance_engine::MaintenanceEngine;

pub fn room(engine: &MaintenanceEngine, room_number: i64, format: OutputFormat) -> Result<()> {
    let predictions = engine.predict_for_room(room_number)?;

    if predictions.is_empty() {
        // Deliberate success case: an empty room is not an error.
        output::print_info(&format!("No devices found for room {room_number}"));
        return Ok(());
    }

    output::print_predictions(&predictions, format);
    Ok(())
}

pub fn device(
    engine: &MaintenanceEngine,
    room_number: i64,
    appliance_type: &str,
    format: OutputFormat,
) -> Result<()> {
    match engine.device_details(room_number, appliance_type)? {
        Some(prediction) => output::print_predictions(std::slice::from_ref(&prediction), format),
        None => output::print_info(&format!(
            "No '{appliance_type}' found in room {room_number}"
        )),
    }
    Ok(())
}
