//! Main entry point for the shop stock tracker
//!
//! This file sets up logging, loads settings, parses command line arguments
//! and starts the collector loop or a one-shot command.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gag_stock_tracker::{Category, DuplicatePolicy, Settings, StockTracker};

/// Command line arguments for the stock tracker
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the per-day stock folders
    /// Overrides `stocks_dir` from the settings file
    #[arg(long)]
    stocks_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the shop on schedule and write daily reports (default)
    Run,

    /// Aggregate one day and append its reports
    Report {
        /// Day to report on, YYYY-MM-DD (defaults to yesterday)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Stop writing all reports if any file already has one
        #[arg(long)]
        abort_all: bool,
    },

    /// Fetch and store the current stock once
    Fetch {
        /// Category to fetch (defaults to all)
        category: Option<Category>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "gag_stock_tracker={log_level},stock={log_level},important=info"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr) // Keep stdout for the statistics display
        .init();

    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(dir) = args.stocks_dir {
        settings.stocks_dir = Some(dir);
    }

    match args.command.unwrap_or(Command::Run) {
        Command::Run => {
            info!("Starting GAG info collector...");
            let tracker = StockTracker::new(settings)?;
            tracker.run().await?;
        }
        Command::Report { date, abort_all } => {
            if abort_all {
                settings.duplicate_policy = DuplicatePolicy::AbortAll;
            }
            let date = match date {
                Some(date) => date,
                None => Local::now()
                    .date_naive()
                    .pred_opt()
                    .ok_or("cannot compute yesterday's date")?,
            };
            let tracker = StockTracker::new(settings)?;
            let outcome = tracker.run_daily_report(date);
            if let Some(report) = outcome.report {
                info!(
                    "Report for {}: {} written, {} already present",
                    date,
                    report.written.len(),
                    report.already_present.len()
                );
            }
        }
        Command::Fetch { category } => {
            let tracker = StockTracker::new(settings)?;
            let categories = match category {
                Some(category) => vec![category],
                None => Category::ALL.to_vec(),
            };
            for category in categories {
                tracker.collect_logged(category).await;
            }
        }
    }

    Ok(())
}
