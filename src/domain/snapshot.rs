//! Snapshot and history types
//!
//! A `Snapshot` is one poll result for one category. A `SnapshotHistory` is the
//! ordered, de-duplicated collection of snapshots rebuilt from a store file.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use crate::domain::StockItem;

/// Format used for timestamps written by the collector
///
/// Local wall-clock time with microseconds and no zone suffix.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Render a local timestamp the way the collector stores it
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Extract the calendar date from a stored ISO-8601 timestamp
///
/// Accepts zone-less timestamps (with or without fractional seconds), a
/// trailing `Z`, explicit `+HH:MM` offsets and bare dates. The date is taken
/// as written, without converting between zones. Returns `None` when the
/// string is not a recognizable timestamp.
pub fn timestamp_date(timestamp: &str) -> Option<NaiveDate> {
    let trimmed = timestamp.trim();
    let normalized = match trimmed.strip_suffix('Z') {
        Some(rest) => format!("{rest}+00:00"),
        None => trimmed.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f%:z") {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").ok()
}

/// One timestamped observation of a category's shop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub timestamp: String,
    pub items: Vec<StockItem>,
}

/// All snapshots recovered for one category, keyed by timestamp
///
/// Keeps first-seen order of timestamps. Inserting an existing timestamp
/// replaces its items in place, so the later occurrence wins while the
/// position stays where the key first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotHistory {
    snapshots: Vec<Snapshot>,
    index: HashMap<String, usize>,
}

impl SnapshotHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the items recorded at `timestamp`
    pub fn insert(&mut self, timestamp: impl Into<String>, items: Vec<StockItem>) {
        let timestamp = timestamp.into();
        match self.index.get(&timestamp) {
            Some(&position) => self.snapshots[position].items = items,
            None => {
                self.index.insert(timestamp.clone(), self.snapshots.len());
                self.snapshots.push(Snapshot { timestamp, items });
            }
        }
    }

    pub fn get(&self, timestamp: &str) -> Option<&[StockItem]> {
        self.index
            .get(timestamp)
            .map(|&position| self.snapshots[position].items.as_slice())
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Snapshots in first-seen timestamp order
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }
}
