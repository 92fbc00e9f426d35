//! Tabular dataset ingestion and schema validation
//!
//! Input is delimited text with an exact-name header row. Each call
//! site validates its own required-column set; missing columns are
//! reported together, in schema-declaration order. Cell-level problems
//! (blank status, malformed numbers) never fail a load; they become
//! optional fields the downstream code can skip.

use crate::error::{EngineError, Result};
use crate::models::{DeviceRecord, NonRoomAsset, TrainingDataset};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Required columns of the training / full hotel dataset
pub const TRAINING_COLUMNS: &[&str] = &[
    "Room Number",
    "Appliance Type",
    "Last Maintenance Date",
    "Usage Hours",
    "Days Since Maintenance",
    "Average_Daily_Usage",
    "Device_Year",
    "Status",
    "Warranty Year",
];

/// Model input columns, in feature order
pub const FEATURE_COLUMNS: &[&str] = &["Usage Hours", "Average_Daily_Usage", "Device_Year"];

/// Regression target column
pub const TARGET_COLUMN: &str = "Days Since Maintenance";

/// Required columns of the non-room asset dataset
pub const NON_ROOM_COLUMNS: &[&str] = &[
    "DeviceID",
    "DeviceType",
    "Location",
    "DeviceYear",
    "WarrantyYear",
    "TotalUsageHours",
    "LastMaintenanceDate",
    "NextScheduledMaintenanceDates",
];

/// Columns from `required` absent in `headers`, keeping declaration order
fn missing_columns(headers: &csv::StringRecord, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect()
}

fn column_index(headers: &csv::StringRecord, name: &str) -> usize {
    headers
        .iter()
        .position(|h| h == name)
        .expect("validated column")
}

fn parse_optional_f64(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

fn parse_optional_year(cell: &str) -> Option<i32> {
    parse_optional_f64(cell).map(|y| y as i32)
}

fn optional_text(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Read a training/full-schema dataset from any reader. `source` is a
/// display label for the originating file, carried through to the
/// dashboard.
pub fn read_training_dataset<R: Read>(reader: R, source: Option<String>) -> Result<TrainingDataset> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let missing = missing_columns(&headers, TRAINING_COLUMNS);
    if !missing.is_empty() {
        return Err(EngineError::MissingColumns(missing));
    }

    let room_idx = column_index(&headers, "Room Number");
    let appliance_idx = column_index(&headers, "Appliance Type");
    let date_idx = column_index(&headers, "Last Maintenance Date");
    let usage_idx = column_index(&headers, "Usage Hours");
    let target_idx = column_index(&headers, TARGET_COLUMN);
    let daily_idx = column_index(&headers, "Average_Daily_Usage");
    let year_idx = column_index(&headers, "Device_Year");
    let status_idx = column_index(&headers, "Status");
    let warranty_idx = column_index(&headers, "Warranty Year");

    let mut records = Vec::new();
    for (row_number, row) in csv_reader.records().enumerate() {
        let row = row?;

        // Room number is the device identity; a row without one cannot
        // participate in any lookup and is dropped with a warning.
        let room_number = match parse_optional_f64(&row[room_idx]) {
            Some(room) => room as i64,
            None => {
                warn!(row = row_number + 1, "skipping row without a numeric room number");
                continue;
            }
        };

        records.push(DeviceRecord {
            room_number,
            appliance_type: row[appliance_idx].trim().to_string(),
            last_maintenance_date: row[date_idx].trim().to_string(),
            usage_hours: parse_optional_f64(&row[usage_idx]),
            average_daily_usage: parse_optional_f64(&row[daily_idx]),
            device_year: parse_optional_f64(&row[year_idx]),
            days_since_maintenance: parse_optional_f64(&row[target_idx]),
            status: optional_text(&row[status_idx]),
            warranty_year: parse_optional_year(&row[warranty_idx]),
        });
    }

    debug!(records = records.len(), source = ?source, "training dataset ingested");

    Ok(TrainingDataset {
        columns: headers.iter().map(|h| h.to_string()).collect(),
        records,
        source,
    })
}

/// Load a training/full-schema dataset from a file path
pub fn load_training_file(path: &Path) -> Result<TrainingDataset> {
    if !path.exists() {
        return Err(EngineError::DatasetNotFound(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string());
    read_training_dataset(file, source)
}

/// Load the non-room asset dataset. Rows that are blank in every
/// column are dropped; everything else passes through as-is.
pub fn load_non_room_assets(path: &Path) -> Result<Vec<NonRoomAsset>> {
    if !path.exists() {
        return Err(EngineError::DatasetNotFound(path.to_path_buf()));
    }

    let mut csv_reader = csv::Reader::from_path(path)?;
    let headers = csv_reader.headers()?.clone();

    let missing = missing_columns(&headers, NON_ROOM_COLUMNS);
    if !missing.is_empty() {
        return Err(EngineError::MissingColumns(missing));
    }

    let id_idx = column_index(&headers, "DeviceID");
    let type_idx = column_index(&headers, "DeviceType");
    let location_idx = column_index(&headers, "Location");
    let year_idx = column_index(&headers, "DeviceYear");
    let warranty_idx = column_index(&headers, "WarrantyYear");
    let usage_idx = column_index(&headers, "TotalUsageHours");
    let last_idx = column_index(&headers, "LastMaintenanceDate");
    let next_idx = column_index(&headers, "NextScheduledMaintenanceDates");

    let mut assets = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        assets.push(NonRoomAsset {
            device_id: row[id_idx].trim().to_string(),
            device_type: row[type_idx].trim().to_string(),
            location: row[location_idx].trim().to_string(),
            device_year: parse_optional_year(&row[year_idx]),
            warranty_year: parse_optional_year(&row[warranty_idx]),
            total_usage_hours: parse_optional_f64(&row[usage_idx]),
            last_maintenance_date: row[last_idx].trim().to_string(),
            next_scheduled_maintenance_dates: row[next_idx].trim().to_string(),
        });
    }

    debug!(assets = assets.len(), path = %path.display(), "non-room assets loaded");

    Ok(assets)
}

/// Logical dataset name -> file location mapping for the pre-registered
/// multi-source selection path
#[derive(Debug, Clone)]
pub struct DatasetRegistry {
    sources: BTreeMap<String, PathBuf>,
}

impl DatasetRegistry {
    pub fn new(sources: BTreeMap<String, PathBuf>) -> Self {
        Self { sources }
    }

    /// Registered logical names, sorted
    pub fn names(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }

    /// Resolve a logical name (case-insensitive) to its file path
    pub fn resolve(&self, name: &str) -> Result<&Path> {
        self.sources
            .get(&name.to_lowercase())
            .map(PathBuf::as_path)
            .ok_or_else(|| EngineError::UnknownDataset {
                name: name.to_string(),
                known: self.names(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_HEADER: &str = "Room Number,Appliance Type,Last Maintenance Date,Usage Hours,Days Since Maintenance,Average_Daily_Usage,Device_Year,Status,Warranty Year";

    #[test]
    fn test_reads_valid_dataset() {
        let csv = format!(
            "{FULL_HEADER}\n2000,TV,01/01/2023,500,300,2,2020,Working,2025\n2001,AC,02/01/2023,800,250,4,2019,,\n"
        );
        let dataset = read_training_dataset(csv.as_bytes(), Some("test.csv".into())).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.columns.len(), 9);
        assert_eq!(dataset.source.as_deref(), Some("test.csv"));

        let first = &dataset.records[0];
        assert_eq!(first.room_number, 2000);
        assert_eq!(first.appliance_type, "TV");
        assert_eq!(first.status.as_deref(), Some("Working"));
        assert_eq!(first.warranty_year, Some(2025));
        assert_eq!(first.feature_vector(), Some([500.0, 2.0, 2020.0]));

        // Blank status and warranty cells stay unset rather than defaulting here.
        let second = &dataset.records[1];
        assert_eq!(second.status, None);
        assert_eq!(second.warranty_year, None);
    }

    #[test]
    fn test_missing_column_named_exactly() {
        let csv = "Room Number,Appliance Type,Last Maintenance Date,Usage Hours,Days Since Maintenance,Average_Daily_Usage,Device_Year,Status\n2000,TV,01/01/2023,500,300,2,2020,Working\n";
        let err = read_training_dataset(csv.as_bytes(), None).unwrap_err();
        match err {
            EngineError::MissingColumns(cols) => assert_eq!(cols, vec!["Warranty Year"]),
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_columns_in_schema_order() {
        let csv = "Appliance Type,Last Maintenance Date,Days Since Maintenance,Average_Daily_Usage,Device_Year,Warranty Year\nTV,01/01/2023,300,2,2020,2025\n";
        let err = read_training_dataset(csv.as_bytes(), None).unwrap_err();
        match err {
            EngineError::MissingColumns(cols) => {
                assert_eq!(cols, vec!["Room Number", "Usage Hours", "Status"]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_cells_become_none() {
        let csv = format!("{FULL_HEADER}\n2000,TV,garbage,n/a,300,2,2020,Working,soon\n");
        let dataset = read_training_dataset(csv.as_bytes(), None).unwrap();
        let record = &dataset.records[0];
        assert_eq!(record.usage_hours, None);
        assert_eq!(record.feature_vector(), None);
        assert_eq!(record.warranty_year, None);
        assert_eq!(record.last_maintenance_date, "garbage");
    }

    #[test]
    fn test_row_without_room_number_dropped() {
        let csv = format!("{FULL_HEADER}\n,TV,01/01/2023,500,300,2,2020,Working,2025\n");
        let dataset = read_training_dataset(csv.as_bytes(), None).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_registry_resolution() {
        let registry = DatasetRegistry::new(BTreeMap::from([(
            "fairfield".to_string(),
            PathBuf::from("FairField.csv"),
        )]));

        assert!(registry.resolve("FairField").is_ok());
        match registry.resolve("ritz").unwrap_err() {
            EngineError::UnknownDataset { name, known } => {
                assert_eq!(name, "ritz");
                assert_eq!(known, vec!["fairfield"]);
            }
            other => panic!("expected UnknownDataset, got {other:?}"),
        }
    }

    #[test]
    fn test_non_room_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets.csv");
        std::fs::write(
            &path,
            "DeviceType,Location,DeviceYear,WarrantyYear,TotalUsageHours,LastMaintenanceDate,NextScheduledMaintenanceDates\nBoiler,Basement,2018,2024,9000,01/01/2023,07/01/2023\n",
        )
        .unwrap();

        match load_non_room_assets(&path).unwrap_err() {
            EngineError::MissingColumns(cols) => assert_eq!(cols, vec!["DeviceID"]),
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_non_room_blank_rows_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets.csv");
        std::fs::write(
            &path,
            "DeviceID,DeviceType,Location,DeviceYear,WarrantyYear,TotalUsageHours,LastMaintenanceDate,NextScheduledMaintenanceDates\nNR-1,Boiler,Basement,2018,2024,9000,01/01/2023,07/01/2023\n,,,,,,,\n",
        )
        .unwrap();

        let assets = load_non_room_assets(&path).unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].device_id, "NR-1");
        assert_eq!(assets[0].device_year, Some(2018));
    }

    #[test]
    fn test_missing_file_is_dataset_not_found() {
        let err = load_training_file(Path::new("does-not-exist.csv")).unwrap_err();
        assert!(matches!(err, EngineError::DatasetNotFound(_)));
    }
}
