//! Collector settings
//!
//! Settings are read from an optional TOML file. Every field has a default,
//! so an empty file (or no file at all) gives a working configuration apart
//! from `api_url`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Category;
use crate::report::DuplicatePolicy;

/// Errors that can occur while loading settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the stock API; `/seeds`, `/gear` and `/eggs` are appended
    pub api_url: String,
    /// ntfy topic; empty disables notifications
    pub ntfy_topic: String,
    pub ntfy_server: String,

    pub important_seeds: Vec<String>,
    pub important_gear: Vec<String>,
    pub important_eggs: Vec<String>,

    /// Minutes of the hour at which seeds and gear are fetched
    pub gear_seeds_minutes: BTreeSet<u32>,
    /// Minutes of the hour at which eggs are fetched
    pub eggs_minutes: BTreeSet<u32>,
    /// Local time of the daily report job, `HH:MM`
    pub daily_stats_time: String,

    pub seeds_gear_delay_secs: u64,
    pub eggs_delay_secs: u64,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,

    pub stocks_dir: Option<PathBuf>,
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            ntfy_topic: String::new(),
            ntfy_server: "https://ntfy.sh".to_string(),
            important_seeds: to_strings(&[
                "Ember Lily",
                "Sugar Apple",
                "Burning Bud",
                "Giant Pinecone",
                "Elder Strawberry",
            ]),
            important_gear: to_strings(&[
                "Godly Sprinkler",
                "Master Sprinkler",
                "Grandmaster Sprinkler",
                "Levelup Lollipop",
            ]),
            important_eggs: to_strings(&["Mythical Egg", "Bug Egg"]),
            gear_seeds_minutes: (0..60).step_by(5).collect(),
            eggs_minutes: [0, 30].into_iter().collect(),
            daily_stats_time: "00:01".to_string(),
            seeds_gear_delay_secs: 30,
            eggs_delay_secs: 10,
            poll_interval_secs: 10,
            request_timeout_secs: 15,
            stocks_dir: None,
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Settings {
    /// Load settings from a TOML file and validate them
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (label, minutes) in [
            ("gear_seeds_minutes", &self.gear_seeds_minutes),
            ("eggs_minutes", &self.eggs_minutes),
        ] {
            if let Some(bad) = minutes.iter().find(|m| **m > 59) {
                return Err(ConfigError::Invalid(format!(
                    "{label} contains {bad}, minutes must be 0-59"
                )));
            }
        }
        self.daily_time()?;
        Ok(())
    }

    pub fn daily_time(&self) -> Result<NaiveTime, ConfigError> {
        NaiveTime::parse_from_str(self.daily_stats_time.trim(), "%H:%M").map_err(|_| {
            ConfigError::Invalid(format!(
                "daily_stats_time must be HH:MM, got '{}'",
                self.daily_stats_time
            ))
        })
    }

    /// Names that trigger an alert for `category`
    pub fn important_items(&self, category: Category) -> &[String] {
        match category {
            Category::Seeds => &self.important_seeds,
            Category::Gear => &self.important_gear,
            Category::Eggs => &self.important_eggs,
        }
    }

    /// Store root: the configured directory, else the platform data directory,
    /// else `./stocks`
    pub fn resolved_stocks_dir(&self) -> PathBuf {
        if let Some(dir) = &self.stocks_dir {
            return dir.clone();
        }
        dirs::data_dir()
            .map(|mut p| {
                p.push("gag_stock_tracker");
                p.push("stocks");
                p
            })
            .unwrap_or_else(|| PathBuf::from("stocks"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
