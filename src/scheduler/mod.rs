//! Deterministic scheduling of collector tasks
//!
//! The collector loop asks the `Scheduler` which tasks are due at a given
//! local instant. The scheduler keeps just enough state to run every minute
//! slot and every daily job once, so tests can drive it with any sequence of
//! instants instead of sleeping.

use std::collections::BTreeSet;
use std::sync::Mutex;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::config::{ConfigError, Settings};

/// Source of the current local time
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the local zone
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Work the collector loop can be asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Aggregate and report on `date` (the day that just ended)
    DailyReport { date: NaiveDate },
    FetchSeedsAndGear,
    FetchEggs,
}

/// When tasks should run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub gear_seeds_minutes: BTreeSet<u32>,
    pub eggs_minutes: BTreeSet<u32>,
    pub daily_at: NaiveTime,
}

impl Schedule {
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self {
            gear_seeds_minutes: settings.gear_seeds_minutes.clone(),
            eggs_minutes: settings.eggs_minutes.clone(),
            daily_at: settings.daily_time()?,
        })
    }
}

/// Start of the minute containing `now`
fn minute_slot(now: NaiveDateTime) -> NaiveDateTime {
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

/// Tracks which slots have already run
#[derive(Debug)]
pub struct Scheduler {
    schedule: Schedule,
    last_gear_seeds: Option<NaiveDateTime>,
    last_eggs: Option<NaiveDateTime>,
    last_daily: Option<NaiveDate>,
}

impl Scheduler {
    /// Create a scheduler started at `now`
    ///
    /// If today's daily time has already passed, the first daily job is the
    /// one tomorrow.
    pub fn new(schedule: Schedule, now: NaiveDateTime) -> Self {
        let last_daily = (now.time() >= schedule.daily_at).then(|| now.date());
        Self {
            schedule,
            last_gear_seeds: None,
            last_eggs: None,
            last_daily,
        }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Tasks due at `now`, in execution order, marking them as run
    pub fn due(&mut self, now: NaiveDateTime) -> Vec<Task> {
        let mut tasks = Vec::new();

        if now.time() >= self.schedule.daily_at && self.last_daily != Some(now.date()) {
            self.last_daily = Some(now.date());
            if let Some(yesterday) = now.date().pred_opt() {
                tasks.push(Task::DailyReport { date: yesterday });
            }
        }

        let slot = minute_slot(now);
        let minute = now.minute();

        if self.schedule.gear_seeds_minutes.contains(&minute) && self.last_gear_seeds != Some(slot) {
            self.last_gear_seeds = Some(slot);
            tasks.push(Task::FetchSeedsAndGear);
        }

        if self.schedule.eggs_minutes.contains(&minute) && self.last_eggs != Some(slot) {
            self.last_eggs = Some(slot);
            tasks.push(Task::FetchEggs);
        }

        tasks
    }
}
