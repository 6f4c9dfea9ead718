//! Free-slot search over a candidate window.
//!
//! # Algorithm
//!
//! 1. Build the candidate window: every selected day at
//!    `[first_hour, last_hour + 1)`, clipped to `[earliest, latest)`.
//! 2. Subtract bookings (all selected resources at once, or each resource
//!    on its own clone of the window).
//! 3. Score every remaining free interval:
//!    - `>= preferred`: full match, key `(0, start_ms, tie)`
//!    - `[15 min, preferred)`: partial match, key `(1, -duration_ms, tie)`
//!    - shorter: discarded
//! 4. The lowest key wins; on equal keys the last candidate evaluated
//!    wins. A full match is truncated to the preferred duration.
//!
//! # Complexity
//! O(r * (b + f)) where r=resources, b=bookings per resource, f=free intervals.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::Rng;

use super::{PlannedSlot, TieBreak};
use crate::models::{Interval, MultiInterval};

/// Shortest free interval still offered as a partial match (15 minutes, ms).
pub const MIN_PARTIAL_MATCH_MS: i64 = 15 * 60 * 1000;

/// Ordering key of a candidate slot; lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SlotScore {
    /// 0 = full match, 1 = partial match.
    pub class: u8,
    /// Start (ms since epoch) for full matches, negative duration (ms) for partial ones.
    pub value: i64,
    /// Resource tie-breaker (0 in multi-match).
    pub tie: i64,
}

/// Union of the selected days' visible hours, clipped to `[earliest, latest)`.
///
/// Days whose hours fall outside the representable range are skipped.
pub fn candidate_window(
    days: &BTreeSet<NaiveDate>,
    first_hour: u32,
    last_hour: u32,
    earliest: NaiveDateTime,
    latest: NaiveDateTime,
) -> MultiInterval {
    let mut window = MultiInterval::new();
    for day in days {
        let midnight = day.and_time(NaiveTime::MIN);
        let from = midnight.checked_add_signed(Duration::hours(i64::from(first_hour)));
        let to = midnight.checked_add_signed(Duration::hours(i64::from(last_hour) + 1));
        match (from, to) {
            (Some(from), Some(to)) => window.add(from, to),
            _ => log::warn!("day {day} is out of range, skipped"),
        }
    }
    window.clip(earliest, latest);
    window
}

/// Scores free intervals left in a candidate window.
#[derive(Debug, Clone)]
pub struct SlotFinder {
    window: MultiInterval,
    preferred_ms: i64,
}

impl SlotFinder {
    /// Creates a finder for a window and preferred duration (ms).
    pub fn new(window: MultiInterval, preferred_ms: i64) -> Self {
        Self {
            window,
            preferred_ms,
        }
    }

    /// The candidate window.
    pub fn window(&self) -> &MultiInterval {
        &self.window
    }

    /// Best slot after subtracting all `bookings` from one shared window.
    pub fn find_multi<RI: Clone>(
        &self,
        bookings: impl IntoIterator<Item = Interval>,
    ) -> Option<PlannedSlot<RI>> {
        let mut free = self.window.clone();
        for booking in bookings {
            free.remove_interval(&booking);
        }

        let mut best: Option<(SlotScore, PlannedSlot<RI>)> = None;
        for interval in free.iter() {
            self.consider(&mut best, interval, 0, None);
        }
        best.map(|(_, slot)| slot)
    }

    /// Best `(resource, slot)` with each resource scored on its own window.
    ///
    /// `resources` pairs every selected resource with its bookings, in
    /// selection order.
    pub fn find_single<RI: Clone, R: Rng>(
        &self,
        resources: &[(RI, Vec<Interval>)],
        tie_break: TieBreak,
        rng: &mut R,
    ) -> Option<PlannedSlot<RI>> {
        let mut best: Option<(SlotScore, PlannedSlot<RI>)> = None;
        for (ordinal, (resource_id, bookings)) in resources.iter().enumerate() {
            let tie = match tie_break {
                TieBreak::ResourceOrder => ordinal as i64,
                TieBreak::Random => rng.random::<i64>(),
            };
            let mut free = self.window.clone();
            for booking in bookings {
                free.remove_interval(booking);
            }
            for interval in free.iter() {
                self.consider(&mut best, interval, tie, Some(resource_id));
            }
        }
        best.map(|(_, slot)| slot)
    }

    /// Scores a free interval, or `None` if it is too short.
    pub fn score(&self, free: &Interval, tie: i64) -> Option<(SlotScore, Interval, bool)> {
        let duration_ms = free.duration_ms();
        if duration_ms >= self.preferred_ms {
            let end = free
                .from()
                .checked_add_signed(Duration::milliseconds(self.preferred_ms))?;
            let range = Interval::new(free.from(), end)?;
            let score = SlotScore {
                class: 0,
                value: free.from().and_utc().timestamp_millis(),
                tie,
            };
            Some((score, range, true))
        } else if duration_ms >= MIN_PARTIAL_MATCH_MS {
            let score = SlotScore {
                class: 1,
                value: -duration_ms,
                tie,
            };
            Some((score, *free, false))
        } else {
            None
        }
    }

    fn consider<RI: Clone>(
        &self,
        best: &mut Option<(SlotScore, PlannedSlot<RI>)>,
        free: &Interval,
        tie: i64,
        resource_id: Option<&RI>,
    ) {
        let Some((score, range, full_match)) = self.score(free, tie) else {
            return;
        };
        if best.as_ref().is_some_and(|(current, _)| *current < score) {
            return;
        }
        *best = Some((
            score,
            PlannedSlot {
                resource_id: resource_id.cloned(),
                range,
                full_match,
            },
        ));
    }
}
