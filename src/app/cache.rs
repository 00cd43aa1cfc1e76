// CampaignLens - app/cache.rs
//
// Compute-once dataset cache owned by the composition root.
//
// The first `get_or_load` call performs the load; concurrent first callers
// block on the `OnceLock` and all observe the same outcome. A failed load is
// memoised too, so the diagnostic is produced once per cache lifetime.

use crate::app::loader::{self, LoadOptions};
use crate::core::model::CampaignTable;
use crate::util::error::LoadError;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Lazily loaded, immutable campaign table.
#[derive(Debug)]
pub struct DatasetCache {
    path: PathBuf,
    options: LoadOptions,
    cell: OnceLock<Result<CampaignTable, LoadError>>,
    empty: CampaignTable,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>, options: LoadOptions) -> Self {
        Self {
            path: path.into(),
            options,
            cell: OnceLock::new(),
            empty: CampaignTable::empty(),
        }
    }

    /// Dataset path this cache loads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the load has already happened (successfully or not).
    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// The table, loading it on first access. A failure is logged once,
    /// when it happens.
    pub fn get_or_load(&self) -> Result<&CampaignTable, &LoadError> {
        self.cell
            .get_or_init(|| {
                let result = loader::load_and_normalize(&self.path, &self.options);
                if let Err(e) = &result {
                    loader::log_failure(&self.path, e);
                }
                result
            })
            .as_ref()
    }

    /// The table, or an empty one if the load failed, plus the failure.
    pub fn table_or_empty(&self) -> (&CampaignTable, Option<&LoadError>) {
        match self.get_or_load() {
            Ok(table) => (table, None),
            Err(e) => (&self.empty, Some(e)),
        }
    }

    /// Same as `load_or_empty`, served from the cache: the table plus no
    /// diagnostics on success, or an empty table plus exactly one.
    pub fn table_and_diagnostics(&self) -> (&CampaignTable, Vec<String>) {
        match self.table_or_empty() {
            (table, None) => (table, Vec::new()),
            (table, Some(e)) => (table, vec![loader::diagnostic(e)]),
        }
    }
}
