//! Daily report rendering and persistence
//!
//! Each category's report is appended to the end of that day's store file as
//! `#`-prefixed lines. The heading doubles as a marker: a file that already
//! contains it is not written again.

pub mod console;

pub use console::render_console;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::analytics::{DailyStats, DailyTotals};
use crate::domain::Category;
use crate::storage::{FileStore, StorageError};

const RULE_WIDTH: usize = 40;

/// What to do when some of the day's files already carry a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Skip only the files that already contain their report
    #[default]
    SkipExisting,
    /// Stop the whole pass at the first file that already has a report,
    /// leaving the remaining categories unwritten
    AbortAll,
}

/// Date format used in report headings
pub fn report_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Idempotence marker for one category and day
pub fn report_marker(category: Category, date: NaiveDate) -> String {
    format!(
        "DAILY {} REPORT - {}",
        category.as_str().to_uppercase(),
        report_date(date)
    )
}

/// Render the report block appended to a store file
///
/// The block starts with two newlines and has no trailing newline.
pub fn render(category: Category, date: NaiveDate, totals: &DailyTotals) -> String {
    let rule = format!("# {}", "=".repeat(RULE_WIDTH));
    let mut lines = vec![
        format!("\n\n# {}", report_marker(category, date)),
        rule.clone(),
        format!(
            "\n# {} {} SUMMARY:",
            category.emoji(),
            category.as_str().to_uppercase()
        ),
    ];

    if totals.is_empty() {
        lines.push(format!("#   No {} appeared yesterday", category));
    } else {
        for (name, quantity) in totals.sorted() {
            lines.push(format!("#   {:<25} x{}", name, quantity));
        }
        lines.push(format!(
            "#   📊 Total: {} unique items, {} total quantity",
            totals.unique_items(),
            totals.total_quantity()
        ));
    }

    lines.push(rule);
    lines.join("\n")
}

/// Result of one report writing pass
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReportOutcome {
    pub written: Vec<Category>,
    /// Files that already held this day's report
    pub already_present: Vec<Category>,
    /// Categories without a store file; reports are never created from nothing
    pub missing: Vec<Category>,
    pub failed: Vec<Category>,
    /// Set when `DuplicatePolicy::AbortAll` stopped the pass
    pub aborted: bool,
}

/// Whether the file at `path` already contains `marker`
///
/// Unreadable files are treated as not containing it.
fn contains_marker(path: &Path, marker: &str) -> bool {
    match fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).contains(marker),
        Err(e) => {
            warn!("Could not read {} to check for a report: {}", path.display(), e);
            false
        }
    }
}

fn append_text(path: &Path, text: &str) -> Result<(), StorageError> {
    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| StorageError::io(path, e))?;
    file.write_all(text.as_bytes())
        .map_err(|e| StorageError::io(path, e))
}

/// Append one category's report unless the file already has it
///
/// Returns `Ok(false)` when the report exists or the store file is missing.
pub fn write_if_absent(
    store: &FileStore,
    category: Category,
    date: NaiveDate,
    totals: &DailyTotals,
) -> Result<bool, StorageError> {
    let path = store.file_path(date, category);
    if !path.is_file() {
        debug!("No {} stock file for {}, skipping report", category, date);
        return Ok(false);
    }
    if contains_marker(&path, &report_marker(category, date)) {
        info!("Daily report already exists in {}", category.file_name());
        return Ok(false);
    }

    append_text(&path, &render(category, date, totals))?;
    Ok(true)
}

/// Write the reports of all categories for `date`
///
/// All blocks are rendered up front. Only files that already exist are
/// appended to.
pub fn write_reports(
    store: &FileStore,
    date: NaiveDate,
    stats: &DailyStats,
    policy: DuplicatePolicy,
) -> ReportOutcome {
    let mut outcome = ReportOutcome::default();

    if !store.day_dir(date).is_dir() {
        debug!("No stock folder for {}, skipping daily reports", date);
        outcome.missing = Category::ALL.to_vec();
        return outcome;
    }

    let blocks: Vec<(Category, String)> = stats
        .iter()
        .map(|(category, totals)| (category, render(category, date, totals)))
        .collect();

    let mut pending = Vec::new();
    for (category, block) in blocks {
        let path = store.file_path(date, category);
        if !path.is_file() {
            outcome.missing.push(category);
            continue;
        }
        if contains_marker(&path, &report_marker(category, date)) {
            info!("Daily report already exists in {}", category.file_name());
            outcome.already_present.push(category);
            if policy == DuplicatePolicy::AbortAll {
                outcome.aborted = true;
                return outcome;
            }
            continue;
        }
        pending.push((category, path, block));
    }

    for (category, path, block) in pending {
        match append_text(&path, &block) {
            Ok(()) => outcome.written.push(category),
            Err(e) => {
                error!("Error writing daily report to {}: {}", category.file_name(), e);
                outcome.failed.push(category);
            }
        }
    }

    if !outcome.written.is_empty() {
        info!("Daily reports written to {} files", outcome.written.len());
    }
    outcome
}
