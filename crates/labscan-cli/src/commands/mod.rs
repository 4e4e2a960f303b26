//! Subcommand implementations.

pub mod batch;
pub mod config;
pub mod process;
pub mod table;

use std::path::Path;

use tracing::debug;

use labscan_core::models::config::LabscanConfig;

/// Load configuration from an explicit path, else from the user config
/// file when present, else defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<LabscanConfig> {
    if let Some(path) = path {
        return Ok(LabscanConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(LabscanConfig::from_file(&default_path)?)
    } else {
        Ok(LabscanConfig::default())
    }
}
