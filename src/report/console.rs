//! Console rendering of the daily statistics

use chrono::NaiveDate;

use crate::analytics::DailyStats;
use crate::report::report_date;

/// Render the statistics shown on stdout after the daily job
///
/// Uses the same totals and ordering as the persisted reports.
pub fn render_console(date: NaiveDate, stats: &DailyStats) -> String {
    let mut lines = vec![
        format!("\n📋 DAILY SHOP STATISTICS - {}", report_date(date)),
        "=".repeat(60),
    ];

    for (category, totals) in stats.iter() {
        lines.push(format!(
            "\n{} {} IN SHOP:",
            category.emoji(),
            category.as_str().to_uppercase()
        ));
        lines.push("-".repeat(40));

        if totals.is_empty() {
            lines.push(format!("   No {} appeared yesterday", category));
            continue;
        }
        for (name, quantity) in totals.sorted() {
            lines.push(format!("   {:<25} x{}", name, quantity));
        }
        lines.push(format!(
            "\n   📊 Total: {} unique items, {} total quantity",
            totals.unique_items(),
            totals.total_quantity()
        ));
    }

    lines.push(format!("\n{}", "=".repeat(60)));
    let mut rendered = lines.join("\n");
    rendered.push('\n');
    rendered
}
