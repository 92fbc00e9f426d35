//! Engine controller: model/dataset lifecycle and snapshot swapping
//!
//! The (model, dataset, metrics) triple lives behind one `Arc` snapshot
//! swapped under a writer-exclusive lock. Readers clone the Arc once
//! per logical operation, so a prediction or aggregation pass never
//! mixes a pre-swap model with a post-swap dataset. Training fits
//! outside the lock; only the swap itself is exclusive.

use crate::aggregate;
use crate::boosting::{regression_metrics, GradientBoostingConfig, GradientBoostingRegressor};
use crate::config::EngineConfig;
use crate::dataset::{
    self, load_non_room_assets, load_training_file, DatasetRegistry, FEATURE_COLUMNS,
    TARGET_COLUMN, TRAINING_COLUMNS,
};
use crate::error::{EngineError, Result};
use crate::models::{
    DashboardStats, DatasetSummary, DevicePrediction, EngineState, ModelMetrics, NonRoomAsset,
    StatusReport, TrainingDataset,
};
use crate::service;
use chrono::{Local, NaiveDate};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

/// One consistent view of the engine's trained state
#[derive(Debug, Clone, Default)]
pub struct EngineSnapshot {
    pub model: Option<Arc<GradientBoostingRegressor>>,
    pub dataset: Option<Arc<TrainingDataset>>,
    pub metrics: Option<ModelMetrics>,
}

struct EngineInner {
    state: EngineState,
    snapshot: Arc<EngineSnapshot>,
}

/// The predictive-maintenance engine controller
pub struct MaintenanceEngine {
    config: EngineConfig,
    registry: DatasetRegistry,
    inner: RwLock<EngineInner>,
}

impl MaintenanceEngine {
    /// Open the engine, reloading any persisted model/dataset pair.
    /// Absent or unreadable artifacts leave the engine in a normal
    /// "not trained" state.
    pub fn open(config: EngineConfig) -> Self {
        let registry = DatasetRegistry::new(config.sources.clone());
        let engine = Self {
            config,
            registry,
            inner: RwLock::new(EngineInner {
                state: EngineState::Uninitialized,
                snapshot: Arc::new(EngineSnapshot::default()),
            }),
        };

        engine.write_inner(|inner| inner.state = EngineState::Loading);
        let snapshot = engine.load_persisted();
        engine.write_inner(|inner| {
            inner.snapshot = Arc::new(snapshot);
            inner.state = EngineState::Ready;
        });
        engine
    }

    fn load_persisted(&self) -> EngineSnapshot {
        let model = match read_json::<GradientBoostingRegressor>(&self.config.model_path) {
            Ok(Some(model)) => {
                info!(path = %self.config.model_path.display(), "persisted model loaded");
                Some(Arc::new(model))
            }
            Ok(None) => {
                info!("no persisted model found");
                None
            }
            Err(error) => {
                warn!(path = %self.config.model_path.display(), %error, "failed to load persisted model");
                None
            }
        };

        let dataset = match read_json::<TrainingDataset>(&self.config.data_path) {
            Ok(Some(dataset)) => {
                info!(
                    path = %self.config.data_path.display(),
                    records = dataset.len(),
                    "persisted training data loaded"
                );
                Some(Arc::new(dataset))
            }
            Ok(None) => {
                info!("no persisted training data found");
                None
            }
            Err(error) => {
                warn!(path = %self.config.data_path.display(), %error, "failed to load persisted training data");
                None
            }
        };

        // Metrics only make sense when both halves of the pair came
        // back and the dataset still carries the training columns.
        let metrics = match (&model, &dataset) {
            (Some(model), Some(dataset)) if dataset.has_columns(&training_feature_columns()) => {
                recompute_metrics(model, dataset)
            }
            _ => None,
        };
        if metrics.is_some() {
            info!("recomputed metrics for reloaded model and data");
        }

        EngineSnapshot {
            model,
            dataset,
            metrics,
        }
    }

    /// Train a new model on the given dataset and atomically swap the
    /// (model, dataset, metrics) triple. On failure the prior state,
    /// including the persisted artifact pair, is untouched.
    pub fn train(&self, mut dataset: TrainingDataset) -> Result<ModelMetrics> {
        self.begin_training()?;

        let outcome = self.fit_and_persist(&mut dataset);
        match outcome {
            Ok((model, metrics)) => {
                self.write_inner(|inner| {
                    inner.snapshot = Arc::new(EngineSnapshot {
                        model: Some(Arc::new(model)),
                        dataset: Some(Arc::new(dataset)),
                        metrics: Some(metrics),
                    });
                    inner.state = EngineState::Ready;
                });
                info!(
                    r2 = metrics.r2_score,
                    mae = metrics.mean_absolute_error,
                    rmse = metrics.root_mean_squared_error,
                    "model trained and persisted"
                );
                Ok(metrics)
            }
            Err(error) => {
                self.write_inner(|inner| inner.state = EngineState::Ready);
                Err(error)
            }
        }
    }

    /// Load a training file and train on it
    pub fn train_from_path(&self, path: &Path) -> Result<ModelMetrics> {
        let dataset = load_training_file(path)?;
        self.train(dataset)
    }

    fn begin_training(&self) -> Result<()> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.state == EngineState::TrainingInProgress {
            return Err(EngineError::TrainingInProgress);
        }
        inner.state = EngineState::TrainingInProgress;
        Ok(())
    }

    fn fit_and_persist(
        &self,
        dataset: &mut TrainingDataset,
    ) -> Result<(GradientBoostingRegressor, ModelMetrics)> {
        let missing: Vec<String> = TRAINING_COLUMNS
            .iter()
            .filter(|col| !dataset.columns.iter().any(|h| h == **col))
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(EngineError::MissingColumns(missing));
        }

        // Training-time defaulting: blank status becomes "Unknown" and
        // is persisted that way with the dataset snapshot.
        for record in &mut dataset.records {
            if record.status.is_none() {
                record.status = Some("Unknown".to_string());
            }
        }

        let (x, y) = training_matrix(dataset);
        if x.is_empty() {
            return Err(EngineError::EmptyDataset);
        }

        let model = GradientBoostingRegressor::fit(GradientBoostingConfig::default(), &x, &y);
        let metrics = regression_metrics(&y, &model.predict_batch(&x));

        self.persist_pair(&model, dataset)?;
        Ok((model, metrics))
    }

    /// Write model and dataset as a pair: both serialized to temp files
    /// first, then renamed, so a crash never leaves one half updated.
    fn persist_pair(&self, model: &GradientBoostingRegressor, dataset: &TrainingDataset) -> Result<()> {
        for path in [&self.config.model_path, &self.config.data_path] {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
        }

        let model_tmp = self.config.model_path.with_extension("tmp");
        let data_tmp = self.config.data_path.with_extension("tmp");
        write_json(&model_tmp, model)?;
        write_json(&data_tmp, dataset)?;

        fs::rename(&model_tmp, &self.config.model_path)?;
        fs::rename(&data_tmp, &self.config.data_path)?;
        Ok(())
    }

    /// Swap in a registered dataset without retraining. Model and
    /// metrics are preserved; nothing is persisted.
    pub fn select_dataset(&self, name: &str) -> Result<DatasetSummary> {
        let path = self.registry.resolve(name)?.to_path_buf();
        let dataset = load_training_file(&path)?;
        let summary = DatasetSummary {
            dataset: name.to_lowercase(),
            loaded_file: dataset.source.clone().unwrap_or_else(|| path.display().to_string()),
            records_loaded: dataset.len(),
            working_devices: aggregate::working_device_count(&dataset.records),
        };

        {
            let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            if inner.state == EngineState::TrainingInProgress {
                return Err(EngineError::TrainingInProgress);
            }
            inner.snapshot = Arc::new(EngineSnapshot {
                model: inner.snapshot.model.clone(),
                dataset: Some(Arc::new(dataset)),
                metrics: inner.snapshot.metrics,
            });
        }

        info!(
            dataset = %summary.dataset,
            records = summary.records_loaded,
            working = summary.working_devices,
            "dataset selected"
        );
        Ok(summary)
    }

    /// One consistent snapshot for a logical read operation
    pub fn snapshot(&self) -> Arc<EngineSnapshot> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot
            .clone()
    }

    pub fn state(&self) -> EngineState {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).state
    }

    pub fn status(&self) -> StatusReport {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let snapshot = &inner.snapshot;
        StatusReport {
            state: inner.state,
            model_trained: snapshot.model.is_some(),
            dataset_loaded: snapshot.dataset.as_ref().is_some_and(|d| !d.is_empty()),
            dataset_records: snapshot.dataset.as_ref().map_or(0, |d| d.len()),
            loaded_data_file: snapshot.dataset.as_ref().and_then(|d| d.source.clone()),
            metrics: snapshot.metrics,
        }
    }

    pub fn predict_for_room(&self, room_number: i64) -> Result<Vec<DevicePrediction>> {
        service::predict_for_room(&self.snapshot(), room_number, today())
    }

    pub fn device_details(
        &self,
        room_number: i64,
        appliance_type: &str,
    ) -> Result<Option<DevicePrediction>> {
        service::device_details(&self.snapshot(), room_number, appliance_type, today())
    }

    pub fn dashboard(&self) -> Result<DashboardStats> {
        aggregate::dashboard(&self.snapshot(), today())
    }

    pub fn upcoming_maintenance(&self) -> Result<Vec<DevicePrediction>> {
        aggregate::upcoming_maintenance(&self.snapshot(), today())
    }

    pub fn weekly_maintenance(&self) -> Result<Vec<DevicePrediction>> {
        aggregate::weekly_maintenance(&self.snapshot(), today())
    }

    pub fn non_room_assets(&self) -> Result<Vec<NonRoomAsset>> {
        load_non_room_assets(&self.config.non_room_path)
    }

    fn write_inner(&self, apply: impl FnOnce(&mut EngineInner)) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        apply(&mut inner);
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn training_feature_columns() -> Vec<&'static str> {
    let mut columns = FEATURE_COLUMNS.to_vec();
    columns.push(TARGET_COLUMN);
    columns
}

/// Feature matrix and target vector from rows with complete numerics
fn training_matrix(dataset: &TrainingDataset) -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for (row_index, record) in dataset.records.iter().enumerate() {
        match (record.feature_vector(), record.days_since_maintenance) {
            (Some(features), Some(target)) => {
                x.push(features.to_vec());
                y.push(target);
            }
            _ => {
                warn!(row = row_index + 1, "excluding row with incomplete numerics from training");
            }
        }
    }
    (x, y)
}

fn recompute_metrics(
    model: &GradientBoostingRegressor,
    dataset: &TrainingDataset,
) -> Option<ModelMetrics> {
    let (x, y) = training_matrix(dataset);
    if x.is_empty() {
        return None;
    }
    Some(regression_metrics(&y, &model.predict_batch(&x)))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let file = fs::File::open(path)?;
    Ok(Some(serde_json::from_reader(file)?))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut file = fs::File::create(path)?;
    serde_json::to_writer(&mut file, value)?;
    file.flush()?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeviceRecord;

    fn dataset_with_target(records: Vec<DeviceRecord>) -> TrainingDataset {
        TrainingDataset {
            columns: dataset::TRAINING_COLUMNS.iter().map(|c| c.to_string()).collect(),
            records,
            source: Some("unit.csv".to_string()),
        }
    }

    fn record(target: Option<f64>) -> DeviceRecord {
        DeviceRecord {
            room_number: 2000,
            appliance_type: "TV".to_string(),
            last_maintenance_date: "01/01/2023".to_string(),
            usage_hours: Some(500.0),
            average_daily_usage: Some(2.0),
            device_year: Some(2020.0),
            days_since_maintenance: target,
            status: None,
            warranty_year: None,
        }
    }

    #[test]
    fn test_training_matrix_excludes_incomplete_rows() {
        let dataset = dataset_with_target(vec![record(Some(300.0)), record(None)]);
        let (x, y) = training_matrix(&dataset);
        assert_eq!(x.len(), 1);
        assert_eq!(y, vec![300.0]);
    }

    #[test]
    fn test_train_defaults_blank_status_to_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MaintenanceEngine::open(EngineConfig {
            model_path: dir.path().join("model.json"),
            data_path: dir.path().join("data.json"),
            ..EngineConfig::default()
        });

        engine.train(dataset_with_target(vec![record(Some(300.0))])).unwrap();

        let snapshot = engine.snapshot();
        let records = &snapshot.dataset.as_ref().unwrap().records;
        assert_eq!(records[0].status.as_deref(), Some("Unknown"));
    }

    #[test]
    fn test_train_on_empty_dataset_reverts_state() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MaintenanceEngine::open(EngineConfig {
            model_path: dir.path().join("model.json"),
            data_path: dir.path().join("data.json"),
            ..EngineConfig::default()
        });

        let err = engine.train(dataset_with_target(vec![record(None)])).unwrap_err();
        assert!(matches!(err, EngineError::EmptyDataset));
        assert_eq!(engine.state(), EngineState::Ready);
        assert!(engine.snapshot().model.is_none());
        assert!(!dir.path().join("model.json").exists());
    }

    #[test]
    fn test_train_rejects_missing_columns() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MaintenanceEngine::open(EngineConfig {
            model_path: dir.path().join("model.json"),
            data_path: dir.path().join("data.json"),
            ..EngineConfig::default()
        });

        let mut dataset = dataset_with_target(vec![record(Some(300.0))]);
        dataset.columns.retain(|c| c != "Warranty Year");

        match engine.train(dataset).unwrap_err() {
            EngineError::MissingColumns(cols) => assert_eq!(cols, vec!["Warranty Year"]),
            other => panic!("expected MissingColumns, got {other:?}"),
        }
        assert_eq!(engine.state(), EngineState::Ready);
    }
}
