//! Storage layer for persisting stock snapshots
//!
//! Snapshots live in append-only text files, one directory per calendar day
//! and one file per category: `<root>/<YYYY-MM-DD>/<category>_stock.txt`.

pub mod file;
pub mod repair;

// Re-export the main storage types
pub use file::*;

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::domain::{Category, StockItem};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Trait defining the snapshot storage interface
///
/// The collector writes through `append_snapshot`; the daily job reads a
/// whole day back through `load_day`. Loading never fails: missing data is
/// reported in the returned `DayLoad`.
pub trait StockStorage {
    /// Append one snapshot for `category`, creating the day directory if needed
    fn append_snapshot(
        &self,
        category: Category,
        timestamp: &NaiveDateTime,
        items: &[StockItem],
    ) -> Result<PathBuf, StorageError>;

    /// Rebuild the histories of all categories for one day
    fn load_day(&self, date: NaiveDate) -> DayLoad;
}
