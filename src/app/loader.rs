// CampaignLens - app/loader.rs
//
// Dataset loading: read the file, decode the CSV, normalise.
//
// Two entry points:
//   - `load_and_normalize` returns an explicit Result so callers decide
//     whether a failure aborts or degrades.
//   - `load_or_empty` is the permissive policy: on failure it reports one
//     diagnostic and hands back an empty table so downstream aggregation
//     runs unchanged.

use crate::core::model::CampaignTable;
use crate::core::normalize::{self, Thresholds};
use crate::core::reader::{self, ReadConfig};
use crate::platform::config::AppConfig;
use crate::platform::fs;
use crate::util::error::LoadError;
use std::io;
use std::path::Path;

/// Everything that controls how a dataset is decoded and categorised.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub read: ReadConfig,
    pub thresholds: Thresholds,
}

impl LoadOptions {
    /// Build options from validated configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            read: ReadConfig {
                delimiter: config.delimiter,
            },
            thresholds: Thresholds {
                short_ratio: config.short_ratio,
                long_ratio: config.long_ratio,
            },
        }
    }
}

/// Load the dataset at `path` and normalise it.
pub fn load_and_normalize(path: &Path, options: &LoadOptions) -> Result<CampaignTable, LoadError> {
    tracing::info!(path = %path.display(), "Loading dataset");

    let content = fs::read_file_lossy(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let raws = reader::read_campaigns(&content, path, &options.read)?;
    Ok(normalize::normalize(raws, &options.thresholds))
}

/// User-facing message for a failed load.
pub fn diagnostic(error: &LoadError) -> String {
    format!("Error loading data: {error}")
}

pub(crate) fn log_failure(path: &Path, error: &LoadError) {
    tracing::error!(path = %path.display(), error = %error, "Dataset load failed");
}

/// Load the dataset, substituting an empty table on failure.
///
/// Returns the table and the diagnostics to show the user: empty on
/// success, exactly one message on failure.
pub fn load_or_empty(path: &Path, options: &LoadOptions) -> (CampaignTable, Vec<String>) {
    match load_and_normalize(path, options) {
        Ok(table) => (table, Vec::new()),
        Err(e) => {
            log_failure(path, &e);
            (CampaignTable::empty(), vec![diagnostic(&e)])
        }
    }
}
