//! Core data models for the maintenance engine

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One historical usage row for a physical device. A dataset may hold
/// several rows per device; the resolver collapses them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub room_number: i64,
    pub appliance_type: String,
    /// Raw date text as ingested; parsed on demand by the date normalizer
    pub last_maintenance_date: String,
    pub usage_hours: Option<f64>,
    pub average_daily_usage: Option<f64>,
    pub device_year: Option<f64>,
    /// Regression target; only meaningful on training rows
    pub days_since_maintenance: Option<f64>,
    /// Reported status text; `None` when the source cell was blank
    pub status: Option<String>,
    pub warranty_year: Option<i32>,
}

impl DeviceRecord {
    /// The three numeric model inputs, or `None` when any cell was
    /// missing or non-numeric
    pub fn feature_vector(&self) -> Option<[f64; 3]> {
        Some([self.usage_hours?, self.average_daily_usage?, self.device_year?])
    }
}

/// An ingested tabular dataset together with its source header row.
/// The header list is persisted alongside the records so a reload can
/// check whether the training-time columns are still present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingDataset {
    pub columns: Vec<String>,
    pub records: Vec<DeviceRecord>,
    /// Display label of the originating file, when known
    pub source: Option<String>,
}

impl TrainingDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether every named column appears in the source header row
    pub fn has_columns(&self, required: &[&str]) -> bool {
        required.iter().all(|c| self.columns.iter().any(|h| h == c))
    }
}

/// In-sample fit metrics computed at train time (and recomputed on
/// reload when the persisted dataset still carries the columns)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub r2_score: f64,
    pub mean_absolute_error: f64,
    pub root_mean_squared_error: f64,
}

/// Derived prediction for a single device; never persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevicePrediction {
    /// 1-based row index in the loaded dataset
    pub device_id: usize,
    pub room_number: i64,
    pub device_name: String,
    /// Status text, defaulted to "None" when the source cell was blank
    pub issue_reported: String,
    pub device_year: Option<i32>,
    pub under_warranty: bool,
    pub warranty_year: Option<i32>,
    pub previous_maintenance_date: Option<NaiveDate>,
    /// Model output clamped to zero, rounded to two decimals
    pub predicted_days_since_maintenance: f64,
    /// Previous date plus the unrounded prediction; `None` when the
    /// source date could not be parsed
    pub next_maintenance_date: Option<NaiveDate>,
}

/// One entry in the dashboard's pending-maintenance list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingMaintenance {
    pub room_number: i64,
    pub device_id: usize,
    pub device_name: String,
    pub maintenance_date: NaiveDate,
}

/// Fleet-wide aggregate counts over the full loaded dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Distinct (room, appliance type) pairs
    pub total_devices: usize,
    /// Rows whose status contains "working" (case-insensitive)
    pub running: usize,
    /// Total rows minus running rows
    pub down: usize,
    /// Rows whose next maintenance date is today or earlier
    pub due_maintenance: usize,
    /// max(0, down - due_maintenance). Derived, not measured; can
    /// disagree with `down` when due rows overlap the running set.
    pub under_maintenance: usize,
    pub pending_maintenance: Vec<PendingMaintenance>,
    pub loaded_data_file: Option<String>,
}

/// Asset row from the non-room dataset, passed through untransformed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NonRoomAsset {
    pub device_id: String,
    pub device_type: String,
    pub location: String,
    pub device_year: Option<i32>,
    pub warranty_year: Option<i32>,
    pub total_usage_hours: Option<f64>,
    pub last_maintenance_date: String,
    pub next_scheduled_maintenance_dates: String,
}

/// Result of selecting a registered dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub dataset: String,
    pub loaded_file: String,
    pub records_loaded: usize,
    /// Rows whose status is blank or exactly "working"/"none"
    /// (case-insensitive)
    pub working_devices: usize,
}

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    Uninitialized,
    Loading,
    Ready,
    TrainingInProgress,
}

/// Snapshot of the engine's externally visible status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub state: EngineState,
    pub model_trained: bool,
    pub dataset_loaded: bool,
    pub dataset_records: usize,
    pub loaded_data_file: Option<String>,
    pub metrics: Option<ModelMetrics>,
}
