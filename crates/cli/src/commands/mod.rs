//! CLI command implementations

pub mod datasets;
pub mod insights;
pub mod predict;
pub mod train;
