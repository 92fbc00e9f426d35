//! Fleet-wide aggregation over the full loaded dataset
//!
//! Aggregations run over every row, not deduplicated devices: repeated
//! historical rows all count. Rows whose date cannot be parsed or whose
//! features are unusable are skipped (with a warning) rather than
//! failing the pass.

use crate::dates::current_week_bounds;
use crate::engine::EngineSnapshot;
use crate::error::{EngineError, Result};
use crate::models::{DashboardStats, DeviceRecord, DevicePrediction, PendingMaintenance};
use crate::service::build_prediction;
use chrono::{Duration, NaiveDate};
use std::collections::HashSet;

/// Length of the "upcoming" window in days (six months)
pub const UPCOMING_WINDOW_DAYS: i64 = 182;

fn require_model_and_data(
    snapshot: &EngineSnapshot,
) -> Result<(
    &crate::boosting::GradientBoostingRegressor,
    &crate::models::TrainingDataset,
)> {
    let model = snapshot.model.as_deref().ok_or(EngineError::ModelUnavailable)?;
    let dataset = snapshot.dataset.as_deref().ok_or(EngineError::DataUnavailable)?;
    if dataset.is_empty() {
        return Err(EngineError::DataUnavailable);
    }
    Ok((model, dataset))
}

/// Rows considered operational when a dataset is selected: blank status,
/// or exactly "working"/"none" (case-insensitive)
pub fn working_device_count(records: &[DeviceRecord]) -> usize {
    records
        .iter()
        .filter(|record| match &record.status {
            None => true,
            Some(status) => {
                let lowered = status.to_lowercase();
                lowered == "working" || lowered == "none"
            }
        })
        .count()
}

/// Fleet dashboard: device counts plus the pending-maintenance list
pub fn dashboard(snapshot: &EngineSnapshot, today: NaiveDate) -> Result<DashboardStats> {
    let (model, dataset) = require_model_and_data(snapshot)?;

    let distinct: HashSet<(i64, &str)> = dataset
        .records
        .iter()
        .map(|record| (record.room_number, record.appliance_type.as_str()))
        .collect();
    let total_devices = distinct.len();

    let running = dataset
        .records
        .iter()
        .filter(|record| {
            record
                .status
                .as_ref()
                .is_some_and(|status| status.to_lowercase().contains("working"))
        })
        .count();
    let down = dataset.len() - running;

    let mut pending_maintenance = Vec::new();
    for (row_index, record) in dataset.records.iter().enumerate() {
        let Some(prediction) = build_prediction(model, row_index, record, today) else {
            continue;
        };
        let Some(next) = prediction.next_maintenance_date else {
            continue;
        };
        if next <= today {
            pending_maintenance.push(PendingMaintenance {
                room_number: record.room_number,
                device_id: row_index + 1,
                device_name: record.appliance_type.clone(),
                maintenance_date: next,
            });
        }
    }
    let due_maintenance = pending_maintenance.len();

    // Derived, not measured; can disagree with `down` when due rows
    // overlap the running set.
    let under_maintenance = down.saturating_sub(due_maintenance);

    Ok(DashboardStats {
        total_devices,
        running,
        down,
        due_maintenance,
        under_maintenance,
        pending_maintenance,
        loaded_data_file: dataset.source.clone(),
    })
}

fn window_filtered(
    snapshot: &EngineSnapshot,
    today: NaiveDate,
    start_exclusive: NaiveDate,
    end_inclusive: NaiveDate,
    include_start: bool,
) -> Result<Vec<DevicePrediction>> {
    let (model, dataset) = require_model_and_data(snapshot)?;

    let mut matches = Vec::new();
    for (row_index, record) in dataset.records.iter().enumerate() {
        let Some(prediction) = build_prediction(model, row_index, record, today) else {
            continue;
        };
        let Some(next) = prediction.next_maintenance_date else {
            continue;
        };
        let after_start = if include_start {
            next >= start_exclusive
        } else {
            next > start_exclusive
        };
        if after_start && next <= end_inclusive {
            matches.push(prediction);
        }
    }
    Ok(matches)
}

/// Devices whose next maintenance falls strictly after today and within
/// the six-month window. A date equal to today is due, never upcoming.
pub fn upcoming_maintenance(
    snapshot: &EngineSnapshot,
    today: NaiveDate,
) -> Result<Vec<DevicePrediction>> {
    window_filtered(
        snapshot,
        today,
        today,
        today + Duration::days(UPCOMING_WINDOW_DAYS),
        false,
    )
}

/// Devices whose next maintenance falls inside the current ISO week
/// [Monday..Sunday], regardless of whether it is before or after today
pub fn weekly_maintenance(
    snapshot: &EngineSnapshot,
    today: NaiveDate,
) -> Result<Vec<DevicePrediction>> {
    let (start, end) = current_week_bounds(today);
    window_filtered(snapshot, today, start, end, true)
}
