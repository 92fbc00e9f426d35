//! Typed error taxonomy for the maintenance engine
//!
//! Row-level problems (unparseable dates, malformed numeric cells) are
//! absorbed where they occur and logged as warnings; only schema and
//! lifecycle violations surface through `EngineError`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the maintenance engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// Required columns absent from an ingested dataset, in
    /// schema-declaration order
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Prediction requested before any model was trained or reloaded
    #[error("no trained model available")]
    ModelUnavailable,

    /// Operation requires a loaded dataset and none is present
    #[error("no training data loaded")]
    DataUnavailable,

    /// Dataset name outside the registered source mapping
    #[error("unknown dataset '{name}'; registered datasets: {}", .known.join(", "))]
    UnknownDataset { name: String, known: Vec<String> },

    /// Registered dataset file missing on disk
    #[error("dataset file not found: {}", .0.display())]
    DatasetNotFound(PathBuf),

    /// Training rejected because no row had usable features and target
    #[error("dataset contains no rows with numeric features and target")]
    EmptyDataset,

    /// A second train/swap attempted while one is in flight
    #[error("a training run is already in progress")]
    TrainingInProgress,

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
