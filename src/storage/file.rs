//! File-backed snapshot store
//!
//! Appends pretty-printed JSON objects to per-day category files and reads
//! them back through the repair scanner.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, error, info};

use crate::domain::{format_timestamp, Category, PerCategory, SnapshotHistory, StockItem};
use crate::storage::repair;
use crate::storage::{StockStorage, StorageError};

/// Outcome of loading one day of snapshots
#[derive(Debug, Default)]
pub struct DayLoad {
    pub date: Option<NaiveDate>,
    pub histories: PerCategory<SnapshotHistory>,
    /// Set when the whole day directory is absent
    pub missing_directory: Option<PathBuf>,
    /// Categories whose file is absent inside an existing day directory
    pub missing_files: Vec<Category>,
    /// Categories whose file exists but could not be read
    pub unreadable: Vec<Category>,
}

impl DayLoad {
    pub fn history(&self, category: Category) -> &SnapshotHistory {
        self.histories.get(category)
    }
}

/// Snapshot store rooted at a `stocks` directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every category file for `date`
    pub fn day_dir(&self, date: NaiveDate) -> PathBuf {
        self.root.join(date.format("%Y-%m-%d").to_string())
    }

    pub fn file_path(&self, date: NaiveDate, category: Category) -> PathBuf {
        self.day_dir(date).join(category.file_name())
    }

    /// Append a snapshot, logging and swallowing any failure
    pub fn append(&self, category: Category, timestamp: &NaiveDateTime, items: &[StockItem]) {
        if let Err(e) = self.append_snapshot(category, timestamp, items) {
            error!("Failed to store {} snapshot: {}", category, e);
        }
    }

    /// Load one category's history for `date`
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub fn load_category(
        &self,
        date: NaiveDate,
        category: Category,
    ) -> Result<Option<SnapshotHistory>, StorageError> {
        let path = self.file_path(date, category);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(path, e)),
        };

        // A write cut mid-character leaves invalid UTF-8 in the tail only
        let content = String::from_utf8_lossy(&bytes);
        let recovery = repair::recover(&content);
        if recovery.dropped > 0 {
            debug!(
                "Dropped {} unparsable chunk(s) from {}",
                recovery.dropped,
                path.display()
            );
        }
        Ok(Some(recovery.history))
    }
}

/// Serialize one snapshot the way it is stored: a single-key object, pretty
/// printed with sorted keys and a trailing newline
pub fn encode_snapshot(timestamp: &str, items: &[StockItem]) -> Result<String, StorageError> {
    let mut object = BTreeMap::new();
    object.insert(timestamp, items);
    let mut encoded = serde_json::to_string_pretty(&object)?;
    encoded.push('\n');
    Ok(encoded)
}

/// Whether `file` is empty or its last byte is a newline
fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

impl StockStorage for FileStore {
    fn append_snapshot(
        &self,
        category: Category,
        timestamp: &NaiveDateTime,
        items: &[StockItem],
    ) -> Result<PathBuf, StorageError> {
        let day_dir = self.day_dir(timestamp.date());
        fs::create_dir_all(&day_dir).map_err(|e| StorageError::io(&day_dir, e))?;

        let path = day_dir.join(category.file_name());
        let mut encoded = encode_snapshot(&format_timestamp(timestamp), items)?;

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|e| StorageError::io(&path, e))?;
        // A report block ends without a newline; keep the next object on its own line
        if !ends_with_newline(&mut file).map_err(|e| StorageError::io(&path, e))? {
            encoded.insert(0, '\n');
        }
        file.write_all(encoded.as_bytes())
            .map_err(|e| StorageError::io(&path, e))?;

        debug!("Stored {} {} item(s) in {}", items.len(), category, path.display());
        Ok(path)
    }

    fn load_day(&self, date: NaiveDate) -> DayLoad {
        let mut load = DayLoad {
            date: Some(date),
            ..DayLoad::default()
        };

        let day_dir = self.day_dir(date);
        if !day_dir.is_dir() {
            error!("Daily stock folder not found: {}", day_dir.display());
            load.missing_directory = Some(day_dir);
            return load;
        }

        for category in Category::ALL {
            match self.load_category(date, category) {
                Ok(Some(history)) => {
                    info!(target: "stock", "Loaded {} stock data: {} timestamps", category, history.len());
                    *load.histories.get_mut(category) = history;
                }
                Ok(None) => load.missing_files.push(category),
                Err(e) => {
                    error!("Error loading {} stock: {}", category, e);
                    load.unreadable.push(category);
                }
            }
        }

        if !load.missing_files.is_empty() {
            let names: Vec<&str> = load.missing_files.iter().map(|c| c.file_name()).collect();
            error!("Stock files not found: {}", names.join(", "));
        }

        load
    }
}
