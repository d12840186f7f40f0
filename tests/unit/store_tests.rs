//! Store round trips and day loading
use chrono::{NaiveDate, NaiveDateTime};
use gag_stock_tracker::*;
use tempfile::TempDir;

fn june_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn at(h: u32, m: u32) -> NaiveDateTime {
    june_first().and_hms_opt(h, m, 0).unwrap()
}

#[cfg(test)]
mod store_unit_tests {
    use super::*;

    #[test]
    fn test_append_then_load_round_trip() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::new(dir.path());
        let items = vec![StockItem::new("Carrot", 5), StockItem::new("Ember Lily", 1)];

        store
            .append_snapshot(Category::Seeds, &at(10, 0), &items)
            .expect("append failed");

        let load = store.load_day(june_first());
        let history = load.history(Category::Seeds);
        assert_eq!(history.len(), 1);
        assert_eq!(history.get("2024-06-01T10:00:00.000000").unwrap(), items.as_slice());
    }

    #[test]
    fn test_duplicate_timestamp_later_write_wins() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        store.append_snapshot(Category::Gear, &at(9, 0), &[StockItem::new("Trowel", 1)]).unwrap();
        store.append_snapshot(Category::Gear, &at(9, 0), &[StockItem::new("Trowel", 4)]).unwrap();

        let load = store.load_day(june_first());
        let history = load.history(Category::Gear);
        assert_eq!(history.len(), 1);
        assert_eq!(history.iter().next().unwrap().items, vec![StockItem::new("Trowel", 4)]);
    }

    #[test]
    fn test_truncated_tail_recovers_first_object() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let day_dir = store.day_dir(june_first());
        std::fs::create_dir_all(&day_dir).unwrap();
        std::fs::write(
            day_dir.join("seeds_stock.txt"),
            "{\"2024-01-01T00:00:00\": [{\"name\":\"Carrot\",\"quantity\":5}]}\n{\"2024-01-01T00:05:00\": [{\"name\"",
        )
        .unwrap();

        let history = store
            .load_category(june_first(), Category::Seeds)
            .unwrap()
            .expect("file should exist");
        assert_eq!(history.len(), 1);
        assert_eq!(
            history.get("2024-01-01T00:00:00").unwrap(),
            &[StockItem::new("Carrot", 5)]
        );
    }

    #[test]
    fn test_missing_directory_empties_all_categories() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        let load = store.load_day(june_first());
        assert_eq!(load.missing_directory, Some(store.day_dir(june_first())));
        assert!(load.missing_files.is_empty());
        for category in Category::ALL {
            assert!(load.history(category).is_empty());
        }
    }

    #[test]
    fn test_missing_single_file_only_affects_that_category() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        store.append_snapshot(Category::Seeds, &at(10, 0), &[StockItem::new("Carrot", 3)]).unwrap();
        store.append_snapshot(Category::Eggs, &at(10, 0), &[StockItem::new("Bug Egg", 1)]).unwrap();

        let load = store.load_day(june_first());
        assert!(load.missing_directory.is_none());
        assert_eq!(load.missing_files, vec![Category::Gear]);
        assert_eq!(load.history(Category::Seeds).len(), 1);
        assert!(load.history(Category::Gear).is_empty());
        assert_eq!(load.history(Category::Eggs).len(), 1);
    }

    #[test]
    fn test_report_lines_do_not_disturb_loading() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        store.append_snapshot(Category::Seeds, &at(10, 0), &[StockItem::new("Carrot", 3)]).unwrap();

        let stats = aggregate_day(&store.load_day(june_first()).histories, june_first());
        write_reports(&store, june_first(), &stats, DuplicatePolicy::SkipExisting);
        store.append_snapshot(Category::Seeds, &at(11, 0), &[StockItem::new("Apple", 2)]).unwrap();

        let history = store.load_day(june_first()).histories.seeds;
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_scenario_totals() {
        let mut history = SnapshotHistory::new();
        history.insert("2024-06-01T10:00:00", vec![StockItem::new("Carrot", 3)]);
        history.insert(
            "2024-06-01T15:00:00",
            vec![StockItem::new("Carrot", 7), StockItem::new("Apple", 2)],
        );

        let totals = aggregate(&history, june_first());
        assert_eq!(totals.get("Carrot"), Some(10));
        assert_eq!(totals.get("Apple"), Some(2));
        assert_eq!(totals.unique_items(), 2);
    }
}
