//! Model training command

use crate::output::{self, OutputFormat};
use anyhow::Result;
use maintenance_engine::MaintenanceEngine;
use std::path::Path;

pub fn train(engine: &MaintenanceEngine, file: &Path, format: OutputFormat) -> Result<()> {
    let metrics = engine.train_from_path(file)?;

    match format {
        OutputFormat::Table => {
            output::print_success("Model trained and persisted");
            println!("  R-squared:               {:.4}", metrics.r2_score);
            println!("  Mean absolute error:     {:.4} days", metrics.mean_absolute_error);
            println!("  Root mean squared error: {:.4} days", metrics.root_mean_squared_error);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
    }

    Ok(())
}
