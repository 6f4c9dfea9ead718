//! Automatic slot planning.
//!
//! Finds a free time range for the selected resources inside the board's
//! visible hours and turns it into the board's time selection.
//!
//! # Modes
//!
//! | Mode | Free time | Result |
//! |------|-----------|--------|
//! | multi-match | window minus the bookings of *all* selected resources | common slot |
//! | single-match | window minus each resource's own bookings | best resource + slot |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching (earliest-start selection)

mod slot_finder;

pub use slot_finder::{candidate_window, SlotFinder, SlotScore, MIN_PARTIAL_MATCH_MS};

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::Interval;

/// Preferred slot length when none (or a non-positive one) is requested.
pub const DEFAULT_PREFERRED_DURATION_MS: i64 = 30 * 60 * 1000;

/// Search horizon when no latest end is requested.
pub const DEFAULT_PLANNING_HORIZON_DAYS: i64 = 10 * 365;

/// How equal single-match scores of different resources are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreak {
    /// Earlier position in the resource selection wins.
    #[default]
    ResourceOrder,
    /// One random key per resource and call.
    Random,
}

/// Parameters of a planning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRequest {
    /// Pick one resource instead of a slot common to all selected resources.
    pub single_match: bool,
    /// Tie-breaking between resources (single-match only).
    pub tie_break: TieBreak,
    /// Lower bound of the search (default: now).
    pub earliest_begin: Option<NaiveDateTime>,
    /// Upper bound of the search (default: now + 10 years).
    pub latest_end: Option<NaiveDateTime>,
    /// Preferred slot length (ms).
    pub preferred_duration_ms: i64,
}

impl Default for PlanRequest {
    fn default() -> Self {
        Self {
            single_match: false,
            tie_break: TieBreak::ResourceOrder,
            earliest_begin: None,
            latest_end: None,
            preferred_duration_ms: DEFAULT_PREFERRED_DURATION_MS,
        }
    }
}

impl PlanRequest {
    /// Creates a multi-match request with default bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches between single- and multi-match.
    pub fn with_single_match(mut self, single_match: bool) -> Self {
        self.single_match = single_match;
        self
    }

    /// Sets the single-match tie-breaker.
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Sets the earliest allowed begin.
    pub fn with_earliest_begin(mut self, time: NaiveDateTime) -> Self {
        self.earliest_begin = Some(time);
        self
    }

    /// Sets the latest allowed end.
    pub fn with_latest_end(mut self, time: NaiveDateTime) -> Self {
        self.latest_end = Some(time);
        self
    }

    /// Sets the preferred slot length (ms).
    pub fn with_preferred_duration_ms(mut self, duration_ms: i64) -> Self {
        self.preferred_duration_ms = duration_ms;
        self
    }

    /// Effective `(earliest, latest, preferred_ms)` relative to `now`.
    pub fn resolve(&self, now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime, i64) {
        let earliest = self.earliest_begin.unwrap_or(now);
        let latest = self
            .latest_end
            .unwrap_or_else(|| {
                now.checked_add_signed(Duration::days(DEFAULT_PLANNING_HORIZON_DAYS))
                    .unwrap_or(NaiveDateTime::MAX)
            });
        let preferred = if self.preferred_duration_ms > 0 {
            self.preferred_duration_ms
        } else {
            DEFAULT_PREFERRED_DURATION_MS
        };
        (earliest, latest, preferred)
    }
}

/// Outcome of a planning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSlot<RI> {
    /// Chosen resource (single-match only).
    pub resource_id: Option<RI>,
    /// Selected time range.
    pub range: Interval,
    /// Whether the range has the preferred length.
    pub full_match: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_resolve_defaults() {
        let (earliest, latest, preferred) = PlanRequest::new().resolve(now());
        assert_eq!(earliest, now());
        assert_eq!(latest, now() + Duration::days(3650));
        assert_eq!(preferred, 30 * 60 * 1000);
    }

    #[test]
    fn test_resolve_horizon_saturates() {
        let late = NaiveDate::MAX.and_hms_opt(0, 0, 0).unwrap();
        let (_, latest, _) = PlanRequest::new().resolve(late);
        assert_eq!(latest, NaiveDateTime::MAX);
    }

    #[test]
    fn test_resolve_explicit() {
        let begin = now() - Duration::hours(2);
        let request = PlanRequest::new()
            .with_single_match(true)
            .with_tie_break(TieBreak::Random)
            .with_earliest_begin(begin)
            .with_latest_end(now())
            .with_preferred_duration_ms(3_600_000);
        assert!(request.single_match);
        assert_eq!(request.resolve(now()), (begin, now(), 3_600_000));
    }

    #[test]
    fn test_non_positive_duration_falls_back() {
        let request = PlanRequest::new().with_preferred_duration_ms(-5);
        assert_eq!(request.resolve(now()).2, DEFAULT_PREFERRED_DURATION_MS);
    }
}
