//! Public library interface for the shop stock tracker
//!
//! This module exports the collector, the snapshot store and the daily
//! aggregation and reporting pipeline built on top of it.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, error, info};

// Internal modules
mod domain;
mod storage;
mod analytics;
mod report;
mod collector;
mod notify;
mod scheduler;
pub mod config;

// Re-export public modules and types
pub use domain::*;
pub use storage::{encode_snapshot, repair, DayLoad, FileStore, StockStorage, StorageError};
pub use analytics::{aggregate, aggregate_day, has_data, DailyStats, DailyTotals};
pub use report::{
    render, render_console, report_marker, write_if_absent, write_reports, DuplicatePolicy,
    ReportOutcome,
};
pub use collector::{
    format_listing, important_alert, important_items, validate_response, CollectorError,
    HttpStockSource, StockSource,
};
pub use notify::{DisabledNotifier, Notification, Notifier, NtfyNotifier};
pub use scheduler::{Clock, ManualClock, Schedule, Scheduler, SystemClock, Task};
pub use config::{ConfigError, Settings};

/// Errors that can occur during tracker operation
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Collector error: {0}")]
    Collector(#[from] CollectorError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result of one daily report run
#[derive(Debug)]
pub struct DailyOutcome {
    pub date: NaiveDate,
    pub load: DayLoad,
    pub stats: DailyStats,
    /// Console rendering, absent when no category had data
    pub console: Option<String>,
    /// Report writing result, absent when no category had data
    pub report: Option<ReportOutcome>,
}

/// Main tracker that polls the shop and maintains the daily store
///
/// Tasks run strictly one after another on the caller's task, so the store
/// only ever has a single writer.
pub struct StockTracker {
    settings: Settings,
    store: FileStore,
    source: Box<dyn StockSource>,
    notifier: Box<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl StockTracker {
    /// Create a tracker talking to the configured API and ntfy topic
    pub fn new(settings: Settings) -> Result<Self, TrackerError> {
        settings.validate()?;
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()?;

        let source = HttpStockSource::new(client.clone(), &settings.api_url);
        let notifier: Box<dyn Notifier> = if settings.ntfy_topic.trim().is_empty() {
            Box::new(DisabledNotifier)
        } else {
            Box::new(NtfyNotifier::new(client, &settings.ntfy_server, &settings.ntfy_topic))
        };
        let store = FileStore::new(settings.resolved_stocks_dir());

        tracing::info!("Initializing stock tracker with store at: {}", store.root().display());

        Ok(Self::with_parts(settings, store, Box::new(source), notifier, Arc::new(SystemClock)))
    }

    /// Assemble a tracker from explicit collaborators
    pub fn with_parts(
        settings: Settings,
        store: FileStore,
        source: Box<dyn StockSource>,
        notifier: Box<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings,
            store,
            source,
            notifier,
            clock,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Fetch one category, store the snapshot and alert on important items
    ///
    /// A failed store write is logged and does not stop the alerts.
    pub async fn collect(&self, category: Category) -> Result<Vec<StockItem>, TrackerError> {
        let items = self.source.fetch(category).await?;
        info!(target: "stock", "{} in stock:\n{}", category, format_listing(&items));

        let timestamp = self.clock.now();
        self.store.append(category, &timestamp, &items);

        for item in items.iter().filter(|item| !category.is_known_item(&item.name)) {
            debug!("Unknown {} item: {}", category, item.name);
        }

        for item in important_items(&items, self.settings.important_items(category)) {
            info!(
                target: "important",
                "🔔 Important {} in Stock: {}",
                category.item_label(),
                item.name
            );
            self.notifier.notify(&important_alert(category, item)).await;
        }

        Ok(items)
    }

    /// Collect one category, logging instead of returning failures
    pub async fn collect_logged(&self, category: Category) {
        match self.collect(category).await {
            Ok(_) => {}
            Err(TrackerError::Collector(CollectorError::RateLimited(message))) => {
                error!("❌ API Rate limit exceeded: {}", message);
            }
            Err(TrackerError::Collector(CollectorError::Http(e))) => {
                error!("Error fetching {}: {}", category, e);
            }
            Err(e) => error!("❌ {}", e),
        }
    }

    /// Load, aggregate, display and persist the report for `date`
    ///
    /// When no category saw stock that day, nothing is displayed or written.
    pub fn run_daily_report(&self, date: NaiveDate) -> DailyOutcome {
        let load = self.store.load_day(date);
        let stats = aggregate_day(&load.histories, date);

        if !has_data(&stats) {
            info!("No stock data available for {} - skipping statistics display", date);
            return DailyOutcome {
                date,
                load,
                stats,
                console: None,
                report: None,
            };
        }

        let console = render_console(date, &stats);
        print!("{}", console);

        let report = write_reports(&self.store, date, &stats, self.settings.duplicate_policy);
        DailyOutcome {
            date,
            load,
            stats,
            console: Some(console),
            report: Some(report),
        }
    }

    /// Run one scheduled task, honoring the configured pacing delays
    pub async fn run_task(&self, task: Task) {
        match task {
            Task::DailyReport { date } => {
                self.run_daily_report(date);
            }
            Task::FetchSeedsAndGear => {
                tokio::time::sleep(Duration::from_secs(self.settings.seeds_gear_delay_secs)).await;
                self.collect_logged(Category::Seeds).await;
                self.collect_logged(Category::Gear).await;
            }
            Task::FetchEggs => {
                tokio::time::sleep(Duration::from_secs(self.settings.eggs_delay_secs)).await;
                self.collect_logged(Category::Eggs).await;
            }
        }
    }

    /// Run every task due now, in order
    pub async fn tick(&self, scheduler: &mut Scheduler) -> Vec<Task> {
        let tasks = scheduler.due(self.clock.now());
        for task in &tasks {
            self.run_task(*task).await;
        }
        tasks
    }

    /// Run the collector loop forever
    pub async fn run(self) -> Result<(), TrackerError> {
        let schedule = Schedule::from_settings(&self.settings)?;
        info!("API URL: {}", self.settings.api_url);
        info!("Gear/Seeds schedule: {:?}", schedule.gear_seeds_minutes);
        info!("Eggs schedule: {:?}", schedule.eggs_minutes);
        info!("Daily statistics scheduled at: {}", schedule.daily_at.format("%H:%M"));

        let mut scheduler = Scheduler::new(schedule, self.clock.now());
        let poll = Duration::from_secs(self.settings.poll_interval_secs.max(1));
        loop {
            self.tick(&mut scheduler).await;
            tokio::time::sleep(poll).await;
        }
    }
}
