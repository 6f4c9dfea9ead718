//! Time intervals and normalized interval sets.
//!
//! Provides the interval arithmetic the planner is built on: half-open
//! ranges and sets of ranges that stay sorted, disjoint and merged after
//! every mutation.
//!
//! # Time Model
//! Instants are wall-clock `NaiveDateTime` values. Durations are reported
//! in milliseconds.
//!
//! # Normalization
//! A [`MultiInterval`] never holds two intervals that overlap or touch:
//! `[8:00, 9:00)` and `[9:00, 10:00)` are stored as `[8:00, 10:00)`.
//! Removing a range may split one interval into two. Zero-length pieces
//! are discarded.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A time interval [from, to).
///
/// Half-open interval: includes `from`, excludes `to`.
/// Always non-degenerate (`from < to`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Interval {
    from: NaiveDateTime,
    to: NaiveDateTime,
}

impl Interval {
    /// Creates a new interval.
    ///
    /// Returns `None` if `from >= to`.
    pub fn new(from: NaiveDateTime, to: NaiveDateTime) -> Option<Self> {
        (from < to).then_some(Self { from, to })
    }

    /// Interval start (inclusive).
    #[inline]
    pub fn from(&self) -> NaiveDateTime {
        self.from
    }

    /// Interval end (exclusive).
    #[inline]
    pub fn to(&self) -> NaiveDateTime {
        self.to
    }

    /// Duration of this interval.
    #[inline]
    pub fn duration(&self) -> Duration {
        self.to - self.from
    }

    /// Duration of this interval (ms).
    #[inline]
    pub fn duration_ms(&self) -> i64 {
        self.duration().num_milliseconds()
    }

    /// Whether an instant falls within this interval.
    #[inline]
    pub fn contains(&self, time: NaiveDateTime) -> bool {
        time >= self.from && time < self.to
    }

    /// Whether two intervals overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.from < other.to && other.from < self.to
    }

    /// Overlapping part of two intervals, if any.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        Self::new(self.from.max(other.from), self.to.min(other.to))
    }
}

/// A normalized set of intervals.
///
/// Intervals are sorted by start, pairwise disjoint and never adjacent.
/// `Clone` yields an independent value copy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MultiInterval {
    intervals: Vec<Interval>,
}

impl MultiInterval {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set from arbitrary (possibly overlapping) intervals.
    pub fn from_intervals(intervals: impl IntoIterator<Item = Interval>) -> Self {
        let mut set = Self::new();
        for interval in intervals {
            set.add_interval(interval);
        }
        set
    }

    /// Adds `[from, to)`, merging with overlapping or adjacent intervals.
    ///
    /// Empty ranges are ignored.
    pub fn add(&mut self, from: NaiveDateTime, to: NaiveDateTime) {
        if let Some(interval) = Interval::new(from, to) {
            self.add_interval(interval);
        }
    }

    /// Adds an interval, merging with overlapping or adjacent intervals.
    pub fn add_interval(&mut self, interval: Interval) {
        // First interval that could touch the new one (its end reaches `from`).
        let first = self
            .intervals
            .partition_point(|iv| iv.to < interval.from);
        // One past the last interval that could touch (its start is at most `to`).
        let last = self
            .intervals
            .partition_point(|iv| iv.from <= interval.to);

        let mut merged = interval;
        if first < last {
            merged.from = merged.from.min(self.intervals[first].from);
            merged.to = merged.to.max(self.intervals[last - 1].to);
        }
        self.intervals.splice(first..last, [merged]);
        debug_assert!(self.is_normalized());
    }

    /// Removes `[from, to)` from the set, splitting intervals as needed.
    pub fn remove(&mut self, from: NaiveDateTime, to: NaiveDateTime) {
        if let Some(interval) = Interval::new(from, to) {
            self.remove_interval(&interval);
        }
    }

    /// Removes an interval from the set, splitting intervals as needed.
    pub fn remove_interval(&mut self, cut: &Interval) {
        let first = self.intervals.partition_point(|iv| iv.to <= cut.from);
        let last = self.intervals.partition_point(|iv| iv.from < cut.to);
        if first >= last {
            return;
        }

        let mut remainder = Vec::with_capacity(2);
        if let Some(left) = Interval::new(self.intervals[first].from, cut.from) {
            remainder.push(left);
        }
        if let Some(right) = Interval::new(cut.to, self.intervals[last - 1].to) {
            remainder.push(right);
        }
        self.intervals.splice(first..last, remainder);
        debug_assert!(self.is_normalized());
    }

    /// Restricts the set to `[from, to)`.
    ///
    /// Everything outside the bound is removed; an empty bound clears the set.
    pub fn clip(&mut self, from: NaiveDateTime, to: NaiveDateTime) {
        if from >= to {
            self.intervals.clear();
            return;
        }
        if let Some(bounds) = self.bounds() {
            if bounds.from < from {
                self.remove(bounds.from, from);
            }
            if bounds.to > to {
                self.remove(to, bounds.to);
            }
        }
    }

    /// Whether the set holds no time at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Number of disjoint intervals.
    #[inline]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Earliest start and latest end, as one interval.
    pub fn bounds(&self) -> Option<Interval> {
        let first = self.intervals.first()?;
        let last = self.intervals.last()?;
        Some(Interval {
            from: first.from,
            to: last.to,
        })
    }

    /// Earliest start, if any.
    pub fn begin(&self) -> Option<NaiveDateTime> {
        self.intervals.first().map(Interval::from)
    }

    /// Latest end, if any.
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.intervals.last().map(Interval::to)
    }

    /// Whether an instant is covered by the set.
    pub fn contains(&self, time: NaiveDateTime) -> bool {
        let idx = self.intervals.partition_point(|iv| iv.to <= time);
        self.intervals.get(idx).is_some_and(|iv| iv.contains(time))
    }

    /// Total covered time (ms).
    pub fn total_duration_ms(&self) -> i64 {
        self.intervals.iter().map(Interval::duration_ms).sum()
    }

    /// Intervals in ascending order.
    #[inline]
    pub fn as_slice(&self) -> &[Interval] {
        &self.intervals
    }

    /// Intervals in ascending order (owned).
    pub fn to_vec(&self) -> Vec<Interval> {
        self.intervals.clone()
    }

    /// Iterates intervals in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &Interval> {
        self.intervals.iter()
    }

    fn is_normalized(&self) -> bool {
        self.intervals.iter().all(|iv| iv.from < iv.to)
            && self.intervals.windows(2).all(|w| w[0].to < w[1].from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    fn iv(h0: u32, m0: u32, h1: u32, m1: u32) -> Interval {
        Interval::new(at(h0, m0), at(h1, m1)).unwrap()
    }

    #[test]
    fn test_interval_basics() {
        let i = iv(8, 0, 9, 0);
        assert_eq!(i.duration_ms(), 3_600_000);
        assert!(i.contains(at(8, 0)));
        assert!(i.contains(at(8, 59)));
        assert!(!i.contains(at(9, 0))); // exclusive end
        assert!(Interval::new(at(9, 0), at(9, 0)).is_none());
        assert!(Interval::new(at(10, 0), at(9, 0)).is_none());
    }

    #[test]
    fn test_interval_overlap() {
        let a = iv(8, 0, 10, 0);
        let b = iv(9, 0, 11, 0);
        assert!(a.overlaps(&b));
        assert_eq!(a.intersection(&b), Some(iv(9, 0, 10, 0)));

        let c = iv(10, 0, 11, 0); // touching
        assert!(!a.overlaps(&c));
        assert_eq!(a.intersection(&c), None);
    }

    #[test]
    fn test_add_merges_adjacent_and_overlapping() {
        let mut set = MultiInterval::new();
        set.add(at(8, 0), at(9, 0));
        set.add(at(10, 0), at(11, 0));
        assert_eq!(set.len(), 2);

        set.add(at(9, 0), at(10, 0)); // bridges both
        assert_eq!(set.to_vec(), vec![iv(8, 0, 11, 0)]);

        set.add(at(7, 0), at(8, 30));
        assert_eq!(set.to_vec(), vec![iv(7, 0, 11, 0)]);
    }

    #[test]
    fn test_add_keeps_order() {
        let mut set = MultiInterval::new();
        set.add(at(14, 0), at(15, 0));
        set.add(at(8, 0), at(9, 0));
        set.add(at(11, 0), at(12, 0));
        assert_eq!(
            set.to_vec(),
            vec![iv(8, 0, 9, 0), iv(11, 0, 12, 0), iv(14, 0, 15, 0)]
        );
    }

    #[test]
    fn test_remove_splits() {
        let mut set = MultiInterval::new();
        set.add(at(8, 0), at(17, 0));
        set.remove(at(9, 0), at(10, 0));
        assert_eq!(set.to_vec(), vec![iv(8, 0, 9, 0), iv(10, 0, 17, 0)]);
    }

    #[test]
    fn test_remove_spanning_multiple() {
        let mut set = MultiInterval::from_intervals([
            iv(8, 0, 9, 0),
            iv(10, 0, 11, 0),
            iv(12, 0, 13, 0),
        ]);
        set.remove(at(8, 30), at(12, 30));
        assert_eq!(set.to_vec(), vec![iv(8, 0, 8, 30), iv(12, 30, 13, 0)]);
    }

    #[test]
    fn test_remove_exact_and_outside() {
        let mut set = MultiInterval::from_intervals([iv(8, 0, 9, 0)]);
        set.remove(at(10, 0), at(11, 0));
        assert_eq!(set.len(), 1);
        set.remove(at(8, 0), at(9, 0));
        assert!(set.is_empty());
    }

    #[test]
    fn test_clip() {
        let mut set = MultiInterval::from_intervals([iv(8, 0, 12, 0), iv(13, 0, 17, 0)]);
        set.clip(at(9, 0), at(14, 0));
        assert_eq!(set.to_vec(), vec![iv(9, 0, 12, 0), iv(13, 0, 14, 0)]);

        set.clip(at(15, 0), at(14, 0));
        assert!(set.is_empty());
    }

    #[test]
    fn test_bounds_and_contains() {
        let set = MultiInterval::from_intervals([iv(10, 0, 11, 0), iv(8, 0, 9, 0)]);
        assert_eq!(set.bounds(), Some(iv(8, 0, 11, 0)));
        assert_eq!(set.begin(), Some(at(8, 0)));
        assert_eq!(set.end(), Some(at(11, 0)));
        assert!(set.contains(at(8, 30)));
        assert!(!set.contains(at(9, 30)));
        assert!(!set.contains(at(11, 0)));
        assert_eq!(set.total_duration_ms(), 7_200_000);
        assert_eq!(MultiInterval::new().bounds(), None);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = MultiInterval::from_intervals([iv(8, 0, 17, 0)]);
        let mut copy = original.clone();
        copy.remove(at(9, 0), at(10, 0));
        assert_eq!(original.to_vec(), vec![iv(8, 0, 17, 0)]);
        assert_eq!(copy.len(), 2);
    }

    fn minutes(m: i64) -> NaiveDateTime {
        at(0, 0) + Duration::minutes(m)
    }

    fn arb_range() -> impl Strategy<Value = (i64, i64)> {
        (0i64..1_000, 1i64..200).prop_map(|(start, len)| (start, start + len))
    }

    proptest! {
        #[test]
        fn prop_add_then_remove_leaves_nothing_of_removed(
            base in prop::collection::vec(arb_range(), 0..8),
            (b0, b1) in arb_range(),
        ) {
            let mut set = MultiInterval::new();
            for (s, e) in &base {
                set.add(minutes(*s), minutes(*e));
            }
            let mut expected = set.clone();
            expected.remove(minutes(b0), minutes(b1));

            set.add(minutes(b0), minutes(b1));
            set.remove(minutes(b0), minutes(b1));
            prop_assert_eq!(set, expected);
        }

        #[test]
        fn prop_mutations_keep_normalized(
            adds in prop::collection::vec(arb_range(), 0..10),
            removes in prop::collection::vec(arb_range(), 0..10),
        ) {
            let mut set = MultiInterval::new();
            for (s, e) in &adds {
                set.add(minutes(*s), minutes(*e));
            }
            for (s, e) in &removes {
                set.remove(minutes(*s), minutes(*e));
            }
            prop_assert!(set.is_normalized());
            for (s, e) in &removes {
                prop_assert!(!set.contains(minutes(*s)));
                prop_assert!(!set.contains(minutes(*e - 1)));
            }
        }

        #[test]
        fn prop_clone_remove_does_not_touch_original(
            adds in prop::collection::vec(arb_range(), 1..6),
            (r0, r1) in arb_range(),
        ) {
            let original = MultiInterval::from_intervals(
                adds.iter().filter_map(|(s, e)| Interval::new(minutes(*s), minutes(*e))),
            );
            let snapshot = original.to_vec();
            let mut copy = original.clone();
            copy.remove(minutes(r0), minutes(r1));
            prop_assert_eq!(original.to_vec(), snapshot);
        }
    }
}
