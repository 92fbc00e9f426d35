//! Per-device prediction service
//!
//! Turns resolved dataset rows into `DevicePrediction`s against one
//! engine snapshot. A lookup miss is an empty result, not an error;
//! only a missing model or dataset is a typed failure.

use crate::boosting::GradientBoostingRegressor;
use crate::dates::{add_predicted_days, parse_maintenance_date};
use crate::engine::EngineSnapshot;
use crate::error::{EngineError, Result};
use crate::models::{DeviceRecord, DevicePrediction};
use crate::resolver;
use chrono::{Datelike, NaiveDate};
use tracing::warn;

/// Build the prediction for one dataset row. Returns `None` when the
/// numeric features are unusable; the caller skips the row.
pub(crate) fn build_prediction(
    model: &GradientBoostingRegressor,
    row_index: usize,
    record: &DeviceRecord,
    today: NaiveDate,
) -> Option<DevicePrediction> {
    let features = match record.feature_vector() {
        Some(features) => features,
        None => {
            warn!(
                row = row_index + 1,
                room = record.room_number,
                appliance = %record.appliance_type,
                "skipping row with missing or non-numeric features"
            );
            return None;
        }
    };

    let predicted_days = model.predict(&features).max(0.0);

    let previous = parse_maintenance_date(&record.last_maintenance_date);
    if previous.is_none() {
        warn!(
            row = row_index + 1,
            room = record.room_number,
            raw = %record.last_maintenance_date,
            "could not parse last maintenance date"
        );
    }
    // Date arithmetic uses the unrounded prediction; only the displayed
    // value is rounded.
    let next = previous.map(|date| add_predicted_days(date, predicted_days));

    Some(DevicePrediction {
        device_id: row_index + 1,
        room_number: record.room_number,
        device_name: record.appliance_type.clone(),
        issue_reported: record
            .status
            .clone()
            .unwrap_or_else(|| "None".to_string()),
        device_year: record.device_year.map(|year| year as i32),
        under_warranty: record
            .warranty_year
            .map_or(false, |year| year >= today.year()),
        warranty_year: record.warranty_year,
        previous_maintenance_date: previous,
        predicted_days_since_maintenance: (predicted_days * 100.0).round() / 100.0,
        next_maintenance_date: next,
    })
}

/// Predict for every current device in a room, one entry per appliance
/// type. An empty room yields an empty list.
pub fn predict_for_room(
    snapshot: &EngineSnapshot,
    room_number: i64,
    today: NaiveDate,
) -> Result<Vec<DevicePrediction>> {
    let model = snapshot.model.as_ref().ok_or(EngineError::ModelUnavailable)?;
    let dataset = snapshot.dataset.as_ref().ok_or(EngineError::DataUnavailable)?;
    if dataset.is_empty() {
        return Err(EngineError::DataUnavailable);
    }

    Ok(resolver::current_devices(&dataset.records, room_number)
        .into_iter()
        .filter_map(|device| build_prediction(model, device.row_index, device.record, today))
        .collect())
}

/// Details for one device by exact (room, appliance type) match on the
/// first matching row. `Ok(None)` on a lookup miss.
pub fn device_details(
    snapshot: &EngineSnapshot,
    room_number: i64,
    appliance_type: &str,
    today: NaiveDate,
) -> Result<Option<DevicePrediction>> {
    let dataset = snapshot.dataset.as_ref().ok_or(EngineError::DataUnavailable)?;
    if dataset.is_empty() {
        return Err(EngineError::DataUnavailable);
    }
    let model = snapshot.model.as_ref().ok_or(EngineError::ModelUnavailable)?;

    let matched = dataset.records.iter().enumerate().find(|(_, record)| {
        record.room_number == room_number && record.appliance_type == appliance_type
    });

    Ok(matched.and_then(|(row_index, record)| build_prediction(model, row_index, record, today)))
}
