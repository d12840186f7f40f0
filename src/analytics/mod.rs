//! Daily aggregation of snapshot histories
//!
//! Sums item quantities over every snapshot recorded on one calendar day.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{timestamp_date, Category, PerCategory, SnapshotHistory};

/// Summed quantity per item name for one category and one day
///
/// Names keep the order in which they were first seen, which is the tie
/// breaker when sorting by quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyTotals {
    totals: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl DailyTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` to the running total for `name`
    pub fn add(&mut self, name: &str, quantity: u64) {
        match self.index.get(name) {
            Some(&position) => {
                let total = &mut self.totals[position].1;
                *total = total.saturating_add(quantity);
            }
            None => {
                self.index.insert(name.to_string(), self.totals.len());
                self.totals.push((name.to_string(), quantity));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.index.get(name).map(|&position| self.totals[position].1)
    }

    /// Number of distinct item names
    pub fn unique_items(&self) -> usize {
        self.totals.len()
    }

    pub fn total_quantity(&self) -> u64 {
        self.totals
            .iter()
            .fold(0u64, |acc, (_, q)| acc.saturating_add(*q))
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Totals in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.totals.iter().map(|(name, q)| (name.as_str(), *q))
    }

    /// Totals by descending quantity, ties kept in first-seen order
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut sorted: Vec<(&str, u64)> = self.iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted
    }
}

/// Per-category totals for one day
pub type DailyStats = PerCategory<DailyTotals>;

/// Sum quantities per item over snapshots taken on `target_date`
///
/// Timestamps that cannot be parsed are skipped.
pub fn aggregate(history: &SnapshotHistory, target_date: NaiveDate) -> DailyTotals {
    let mut totals = DailyTotals::new();

    for snapshot in history.iter() {
        match timestamp_date(&snapshot.timestamp) {
            Some(date) if date == target_date => {
                for item in &snapshot.items {
                    totals.add(&item.name, item.quantity);
                }
            }
            Some(_) => {}
            None => debug!("Skipping snapshot with unparsable timestamp: {}", snapshot.timestamp),
        }
    }

    totals
}

/// Aggregate every category of a loaded day
pub fn aggregate_day(histories: &PerCategory<SnapshotHistory>, target_date: NaiveDate) -> DailyStats {
    PerCategory::from_fn(|category: Category| aggregate(histories.get(category), target_date))
}

/// Whether any category saw stock on the day
pub fn has_data(stats: &DailyStats) -> bool {
    stats.iter().any(|(_, totals)| !totals.is_empty())
}
