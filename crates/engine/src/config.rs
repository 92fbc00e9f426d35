//! Engine configuration

use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Engine configuration: artifact paths and the registered dataset
/// sources. Loaded from the `HMP_*` environment and an optional `hmp`
/// config file.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Path of the persisted model artifact
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Path of the persisted dataset snapshot paired with the model
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Logical dataset name -> CSV file location
    #[serde(default = "default_sources")]
    pub sources: BTreeMap<String, PathBuf>,

    /// Location of the non-room asset dataset
    #[serde(default = "default_non_room_path")]
    pub non_room_path: PathBuf,
}

fn default_model_path() -> PathBuf {
    PathBuf::from("model/hotel_maintenance_model.json")
}

fn default_data_path() -> PathBuf {
    PathBuf::from("model/hotel_training_data.json")
}

fn default_sources() -> BTreeMap<String, PathBuf> {
    BTreeMap::from([
        ("fairfield".to_string(), PathBuf::from("FairField.csv")),
        ("jwmarriott".to_string(), PathBuf::from("JW Marriott.csv")),
        ("westin".to_string(), PathBuf::from("Westin.csv")),
    ])
}

fn default_non_room_path() -> PathBuf {
    PathBuf::from("non-room-hotel.csv")
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            data_path: default_data_path(),
            sources: default_sources(),
            non_room_path: default_non_room_path(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment and config file
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("hmp").required(false))
            .add_source(config::Environment::with_prefix("HMP"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }
}
