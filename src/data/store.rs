use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use super::loader::{load_file, LoadOptions};
use super::model::FlightTable;

// ---------------------------------------------------------------------------
// FlightStore – owner of the base table for a session
// ---------------------------------------------------------------------------

/// Loads the base table lazily and at most once, until told otherwise.
///
/// Every consumer gets the same read-only `Arc`; a changed file on disk is
/// only picked up through [`FlightStore::reload`] or
/// [`FlightStore::invalidate`].
#[derive(Debug)]
pub struct FlightStore {
    path: PathBuf,
    options: LoadOptions,
    table: Option<Arc<FlightTable>>,
    loads: usize,
}

impl FlightStore {
    pub fn new(path: impl Into<PathBuf>, options: LoadOptions) -> Self {
        FlightStore {
            path: path.into(),
            options,
            table: None,
            loads: 0,
        }
    }

    /// Construct and load immediately, failing if the file cannot be read.
    pub fn open(path: impl Into<PathBuf>, options: LoadOptions) -> Result<Self> {
        let mut store = Self::new(path, options);
        store.table()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The cached table, loading it on first use.
    pub fn table(&mut self) -> Result<Arc<FlightTable>> {
        if let Some(table) = &self.table {
            return Ok(Arc::clone(table));
        }
        self.reload()
    }

    /// The cached table without triggering a load.
    pub fn cached(&self) -> Option<Arc<FlightTable>> {
        self.table.clone()
    }

    /// Read the file again and replace the cached table.  On failure the
    /// previous table is kept.
    pub fn reload(&mut self) -> Result<Arc<FlightTable>> {
        let table = Arc::new(load_file(&self.path, &self.options)?);
        self.loads += 1;
        self.table = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Drop the cached table; the next [`FlightStore::table`] call reloads.
    pub fn invalidate(&mut self) {
        if self.table.take().is_some() {
            log::debug!("Invalidated cached table for {}", self.path.display());
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.table.is_some()
    }

    /// Number of successful loads so far.
    pub fn load_count(&self) -> usize {
        self.loads
    }
}
