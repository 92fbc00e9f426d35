//! Predictive-maintenance engine for hotel-room appliances
//!
//! This crate provides the core functionality for:
//! - Tabular dataset ingestion and schema validation
//! - Gradient-boosted regression over usage features
//! - Model/dataset persistence as an atomic artifact pair
//! - Per-device prediction and per-room device resolution
//! - Fleet-wide dashboard and maintenance-window aggregation

pub mod aggregate;
pub mod boosting;
pub mod config;
pub mod dataset;
pub mod dates;
pub mod engine;
pub mod error;
pub mod models;
pub mod resolver;
pub mod service;

pub use config::EngineConfig;
pub use engine::{EngineSnapshot, MaintenanceEngine};
pub use error::{EngineError, Result};
pub use models::*;
