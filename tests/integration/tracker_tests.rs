//! End-to-end tracker tests with in-memory collaborators
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use gag_stock_tracker::*;
use tempfile::TempDir;

/// Stock source serving canned listings
struct FakeSource {
    listings: HashMap<Category, Vec<StockItem>>,
    calls: Arc<Mutex<Vec<Category>>>,
}

impl FakeSource {
    fn new(calls: Arc<Mutex<Vec<Category>>>) -> Self {
        let mut listings = HashMap::new();
        listings.insert(
            Category::Seeds,
            vec![StockItem::new("Carrot", 5), StockItem::new("Ember Lily", 1)],
        );
        listings.insert(Category::Gear, vec![StockItem::new("Trowel", 2)]);
        Self { listings, calls }
    }
}

#[async_trait]
impl StockSource for FakeSource {
    async fn fetch(&self, category: Category) -> Result<Vec<StockItem>, CollectorError> {
        self.calls.lock().unwrap().push(category);
        match self.listings.get(&category) {
            Some(items) => Ok(items.clone()),
            None => Err(CollectorError::RateLimited("Rate limit exceeded".to_string())),
        }
    }
}

/// Notifier that remembers everything it was asked to send
struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) {
        self.sent.lock().unwrap().push(notification.clone());
    }
}

fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap().and_hms_opt(h, m, 0).unwrap()
}

fn quiet_settings() -> Settings {
    Settings {
        seeds_gear_delay_secs: 0,
        eggs_delay_secs: 0,
        ..Settings::default()
    }
}

struct Harness {
    _dir: TempDir,
    tracker: StockTracker,
    calls: Arc<Mutex<Vec<Category>>>,
    sent: Arc<Mutex<Vec<Notification>>>,
    clock: Arc<ManualClock>,
}

fn harness(start: NaiveDateTime) -> Harness {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let calls = Arc::new(Mutex::new(Vec::new()));
    let sent = Arc::new(Mutex::new(Vec::new()));
    let clock = Arc::new(ManualClock::new(start));
    let tracker = StockTracker::with_parts(
        quiet_settings(),
        FileStore::new(dir.path()),
        Box::new(FakeSource::new(calls.clone())),
        Box::new(RecordingNotifier { sent: sent.clone() }),
        clock.clone(),
    );
    Harness {
        _dir: dir,
        tracker,
        calls,
        sent,
        clock,
    }
}

#[cfg(test)]
mod tracker_integration_tests {
    use super::*;

    #[tokio::test]
    async fn test_collect_stores_snapshot_and_alerts() {
        let h = harness(at(1, 10, 0));

        let items = h.tracker.collect(Category::Seeds).await.expect("collect failed");
        assert_eq!(items.len(), 2);

        let history = h
            .tracker
            .store()
            .load_category(at(1, 10, 0).date(), Category::Seeds)
            .unwrap()
            .expect("seeds file should exist");
        assert_eq!(history.get("2024-06-01T10:00:00.000000").unwrap(), items.as_slice());

        let sent = h.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].message, "🔔 Important Seed in Stock: Ember Lily");
    }

    #[tokio::test]
    async fn test_failed_fetch_stores_nothing() {
        let h = harness(at(1, 10, 0));

        assert!(h.tracker.collect(Category::Eggs).await.is_err());
        h.tracker.collect_logged(Category::Eggs).await;
        assert!(!h.tracker.store().day_dir(at(1, 10, 0).date()).exists());
        assert!(h.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tick_runs_due_fetches_once_per_slot() {
        let h = harness(at(1, 10, 58));
        let schedule = Schedule::from_settings(h.tracker.settings()).unwrap();
        let mut scheduler = Scheduler::new(schedule, h.clock.now());

        assert!(h.tracker.tick(&mut scheduler).await.is_empty());

        h.clock.set(at(1, 11, 0));
        let tasks = h.tracker.tick(&mut scheduler).await;
        assert_eq!(tasks, vec![Task::FetchSeedsAndGear, Task::FetchEggs]);

        h.clock.advance(Duration::seconds(10));
        assert!(h.tracker.tick(&mut scheduler).await.is_empty());

        let calls = h.calls.lock().unwrap().clone();
        assert_eq!(calls, vec![Category::Seeds, Category::Gear, Category::Eggs]);
    }

    #[tokio::test]
    async fn test_daily_job_after_midnight_reports_previous_day() {
        let h = harness(at(1, 10, 0));
        let schedule = Schedule::from_settings(h.tracker.settings()).unwrap();
        let mut scheduler = Scheduler::new(schedule, h.clock.now());

        h.tracker.collect(Category::Seeds).await.unwrap();
        h.clock.set(at(1, 15, 0));
        h.tracker.collect(Category::Seeds).await.unwrap();
        h.tracker.collect(Category::Gear).await.unwrap();

        h.clock.set(at(2, 0, 1));
        let tasks = h.tracker.tick(&mut scheduler).await;
        assert_eq!(tasks, vec![Task::DailyReport { date: at(1, 0, 0).date() }]);

        let seeds = std::fs::read_to_string(
            h.tracker.store().file_path(at(1, 0, 0).date(), Category::Seeds),
        )
        .unwrap();
        assert!(seeds.contains("# DAILY SEEDS REPORT - 01.06.2024"));
        assert!(seeds.contains("x10"));
        assert!(seeds.contains("2 unique items, 12 total quantity"));
    }

    #[tokio::test]
    async fn test_daily_report_outcome() {
        let h = harness(at(1, 9, 0));
        h.tracker.collect(Category::Gear).await.unwrap();

        let outcome = h.tracker.run_daily_report(at(1, 0, 0).date());
        assert_eq!(outcome.load.missing_files, vec![Category::Seeds, Category::Eggs]);
        assert_eq!(outcome.stats.gear.get("Trowel"), Some(2));
        let console = outcome.console.expect("console output expected");
        assert!(console.contains("🔧 GEAR IN SHOP:"));
        let report = outcome.report.expect("report expected");
        assert_eq!(report.written, vec![Category::Gear]);

        let again = h.tracker.run_daily_report(at(1, 0, 0).date());
        assert!(again.report.unwrap().written.is_empty());
    }

    #[test]
    fn test_daily_report_without_data_skips_everything() {
        let h = harness(at(1, 9, 0));
        let outcome = h.tracker.run_daily_report(at(1, 0, 0).date());
        assert!(outcome.load.missing_directory.is_some());
        assert!(outcome.console.is_none());
        assert!(outcome.report.is_none());
    }

    #[test]
    fn test_collect_with_blocking_runtime() {
        let h = harness(at(3, 12, 0));
        let items = tokio_test::block_on(h.tracker.collect(Category::Gear)).unwrap();
        assert_eq!(items, vec![StockItem::new("Trowel", 2)]);
    }
}
