//! Board configuration.
//!
//! Everything that shapes the time axis. Deserializable so a host
//! application can keep board settings in its own config files; missing
//! fields fall back to the defaults below.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Shortest allowed intraday column (15 minutes, ms).
pub const MIN_INTRADAY_INTERVAL_MS: i64 = 15 * 60 * 1000;

/// Longest allowed intraday column (24 hours, ms).
pub const MAX_INTRADAY_INTERVAL_MS: i64 = 24 * 60 * 60 * 1000;

/// How the axis is split into major and minor columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanningMode {
    /// Major = day, minor = fixed interval between the first and last hour.
    #[default]
    Intraday,
    /// Major = month, minor = day.
    Day,
    /// Major = month, minor = week.
    Week,
}

/// Time-axis settings of a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Column layout.
    pub planning_mode: PlanningMode,
    /// First visible hour of an intraday day (0..=23).
    pub first_hour_of_day: u32,
    /// Last visible hour of an intraday day (0..=23, inclusive).
    pub last_hour_of_day: u32,
    /// Width of an intraday minor column (ms).
    pub intraday_interval_ms: i64,
    /// Days per week column when `work_days_only` is set (1..=6).
    pub work_day_count: u32,
    /// Week columns cover only `work_day_count` days instead of seven.
    pub work_days_only: bool,
    /// Selected days.
    pub days: BTreeSet<NaiveDate>,
}

impl BoardConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the planning mode.
    pub fn with_planning_mode(mut self, mode: PlanningMode) -> Self {
        self.planning_mode = mode;
        self
    }

    /// Sets the visible hours (both inclusive).
    pub fn with_hours(mut self, first: u32, last: u32) -> Self {
        self.first_hour_of_day = first;
        self.last_hour_of_day = last;
        self
    }

    /// Sets the intraday column width (ms).
    pub fn with_intraday_interval(mut self, interval_ms: i64) -> Self {
        self.intraday_interval_ms = interval_ms;
        self
    }

    /// Restricts week columns to the first `count` days.
    pub fn with_work_days(mut self, count: u32) -> Self {
        self.work_day_count = count;
        self.work_days_only = true;
        self
    }

    /// Sets the selected days.
    pub fn with_days(mut self, days: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.days = days.into_iter().collect();
        self
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            planning_mode: PlanningMode::Intraday,
            first_hour_of_day: 8,
            last_hour_of_day: 16,
            intraday_interval_ms: 30 * 60 * 1000,
            work_day_count: 5,
            work_days_only: false,
            days: BTreeSet::new(),
        }
    }
}
