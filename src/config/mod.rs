//! Configuration module
//!
//! Handles loading settings from YAML files and environment variables.
//! Nothing here is required: without a file the defaults talk to NCBI
//! E-utilities.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable naming a settings file
pub const SETTINGS_PATH_VAR: &str = "PUBMED_OPTIMIZER_SETTINGS";

/// Load settings from `explicit`, the environment, the default locations, or defaults
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    let mut settings = match find_settings_file(explicit) {
        Some(path) => {
            info!("Loading settings from: {}", path.display());
            Settings::from_file(&path)?
        }
        None => Settings::default(),
    };
    settings.merge_env();
    settings.validate()?;
    Ok(settings)
}

fn find_settings_file(explicit: Option<&Path>) -> Option<PathBuf> {
    // An explicit path is used even if missing so the read error surfaces
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(SETTINGS_PATH_VAR) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let mut candidates = vec![PathBuf::from("pubmed-optimizer.yml")];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("pubmed-optimizer/settings.yml"));
    }
    candidates.into_iter().find(|p| p.exists())
}
