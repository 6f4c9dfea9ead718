//! Two-level time axis and its coordinate mapping.
//!
//! # Coordinate Space
//!
//! The axis maps onto `[0, 1]` with every minor column taking an equal
//! `1/N` share, regardless of how much wall-clock time it covers. A day
//! column and a one-hour column next to each other are equally wide.
//!
//! # Gaps
//!
//! Minor columns need not be contiguous (e.g. lunch break excluded, or
//! weekends skipped in work-week mode). An instant that falls into a gap
//! belongs to the *following* column when it marks a start and to the
//! *preceding* column when it marks an end, see [`ColumnBoundary`].

use std::cell::OnceCell;

use chrono::{Duration, NaiveDateTime};

use super::column::{ColumnLabels, MajorColumn, MajorColumnId, MinorColumn};
use crate::error::{PlannerError, PlannerResult};
use crate::models::Interval;

const INDEX_EPSILON: f64 = 1e-9;

/// Which end of a range an instant describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnBoundary {
    /// Inclusive start: gap instants move forward to the next column.
    Start,
    /// Exclusive end: gap instants move back to the previous column.
    End,
}

/// Two-level column structure (major columns containing minor columns).
///
/// Major columns are stored in insertion order; sorted views are derived
/// lazily and dropped on every structural change.
#[derive(Debug, Clone, Default)]
pub struct TimeAxis {
    majors: Vec<MajorColumn>,
    sorted_majors: OnceCell<Vec<usize>>,
    sorted_minors: OnceCell<Vec<MinorColumn>>,
}

impl TimeAxis {
    /// Creates an empty axis.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a major column and returns its id.
    pub fn add_major_column(
        &mut self,
        labels: ColumnLabels,
        tooltip: impl Into<String>,
    ) -> MajorColumnId {
        let id = MajorColumnId(self.majors.len());
        self.majors.push(MajorColumn::new(id, labels, tooltip.into()));
        self.invalidate();
        id
    }

    /// Appends a minor column `[begin, end)` to a major column.
    pub fn add_minor_column(
        &mut self,
        major: MajorColumnId,
        begin: NaiveDateTime,
        end: NaiveDateTime,
        labels: ColumnLabels,
        tooltip: impl Into<String>,
    ) -> PlannerResult<()> {
        let interval = Interval::new(begin, end).ok_or(PlannerError::EmptyColumnRange)?;
        let parent = self
            .majors
            .get_mut(major.0)
            .ok_or(PlannerError::UnknownMajorColumn(major.0))?;
        parent.push_child(MinorColumn::new(interval, labels, tooltip.into(), major));
        self.invalidate();
        Ok(())
    }

    fn invalidate(&mut self) {
        self.sorted_majors = OnceCell::new();
        self.sorted_minors = OnceCell::new();
    }

    /// Major column by id.
    pub fn major_column(&self, id: MajorColumnId) -> Option<&MajorColumn> {
        self.majors.get(id.0)
    }

    /// Major columns ordered by their first child's start.
    ///
    /// Ties (and childless columns, which sort last) keep insertion order.
    pub fn major_columns(&self) -> Vec<&MajorColumn> {
        self.major_order().iter().map(|&i| &self.majors[i]).collect()
    }

    fn major_order(&self) -> &[usize] {
        self.sorted_majors.get_or_init(|| {
            let mut order: Vec<usize> = (0..self.majors.len()).collect();
            order.sort_by_key(|&i| {
                let begin = self.majors[i].begin_time();
                (begin.is_none(), begin, i)
            });
            order
        })
    }

    /// All minor columns, ordered by start time.
    pub fn minor_columns(&self) -> &[MinorColumn] {
        self.sorted_minors.get_or_init(|| {
            let mut minors: Vec<MinorColumn> = self
                .major_order()
                .iter()
                .flat_map(|&i| self.majors[i].children().iter().cloned())
                .collect();
            // Stable: equal starts keep major/insertion order.
            minors.sort_by_key(MinorColumn::begin_time);
            minors
        })
    }

    /// Number of minor columns.
    pub fn column_count(&self) -> usize {
        self.minor_columns().len()
    }

    /// Whether the axis has no minor columns.
    pub fn is_empty(&self) -> bool {
        self.column_count() == 0
    }

    /// Minor column by index.
    pub fn minor_column(&self, index: usize) -> Option<&MinorColumn> {
        self.minor_columns().get(index)
    }

    /// Start of the first minor column.
    pub fn begin_time(&self) -> Option<NaiveDateTime> {
        self.minor_columns().first().map(MinorColumn::begin_time)
    }

    /// End of the last minor column.
    pub fn end_time(&self) -> Option<NaiveDateTime> {
        self.minor_columns().last().map(MinorColumn::end_time)
    }

    /// Index of the minor column an instant belongs to.
    ///
    /// Instants inside a column map to that column. Instants in a gap (or
    /// outside the axis) map according to `boundary`:
    /// - [`ColumnBoundary::Start`]: the first column ending after `time`
    /// - [`ColumnBoundary::End`]: the last column starting before `time`
    ///
    /// Returns `None` if no such column exists.
    pub fn column_index_at(&self, time: NaiveDateTime, boundary: ColumnBoundary) -> Option<usize> {
        let minors = self.minor_columns();
        match boundary {
            ColumnBoundary::Start => {
                let idx = minors.partition_point(|c| c.end_time() <= time);
                (idx < minors.len()).then_some(idx)
            }
            ColumnBoundary::End => minors
                .partition_point(|c| c.begin_time() < time)
                .checked_sub(1),
        }
    }

    /// Normalized span `[f0, f1]` covering every column `[begin, end)` touches.
    ///
    /// Returns `None` if the range lies entirely outside the axis or
    /// entirely inside a gap.
    pub fn range_of(&self, begin: NaiveDateTime, end: NaiveDateTime) -> Option<[f64; 2]> {
        if begin >= end {
            return None;
        }
        let n = self.column_count();
        let first = self.column_index_at(begin, ColumnBoundary::Start)?;
        let last = self.column_index_at(end, ColumnBoundary::End)?;
        if first > last {
            return None;
        }
        Some([first as f64 / n as f64, (last + 1) as f64 / n as f64])
    }

    /// Normalized span of a single column.
    pub fn column_range(&self, index: usize) -> Option<[f64; 2]> {
        let n = self.column_count();
        (index < n).then(|| [index as f64 / n as f64, (index + 1) as f64 / n as f64])
    }

    /// Index of the column at a normalized location, clamped to the axis.
    pub fn location_to_index(&self, x: f64) -> Option<usize> {
        let n = self.column_count();
        if n == 0 || x.is_nan() {
            return None;
        }
        let pos = (x * n as f64 + INDEX_EPSILON).floor();
        Some(pos.clamp(0.0, (n - 1) as f64) as usize)
    }

    /// Column at a normalized location, clamped to the axis.
    pub fn location_to_column(&self, x: f64) -> Option<&MinorColumn> {
        self.location_to_index(x)
            .and_then(|idx| self.minor_column(idx))
    }

    /// Instant at a normalized location.
    ///
    /// Interpolates linearly between the located column's begin and end.
    pub fn time_at(&self, x: f64) -> Option<NaiveDateTime> {
        let idx = self.location_to_index(x)?;
        let column = self.minor_column(idx)?;
        let n = self.column_count() as f64;
        let fraction = (x * n - idx as f64).clamp(0.0, 1.0);
        let span_ms = (column.end_time() - column.begin_time()).num_milliseconds();
        let offset_ms = (span_ms as f64 * fraction).round() as i64;
        Some(column.begin_time() + Duration::milliseconds(offset_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    /// One major column with hourly minors for the given start hours.
    fn hourly(hours: &[u32]) -> TimeAxis {
        let mut axis = TimeAxis::new();
        let day = axis.add_major_column(ColumnLabels::uniform("Mon"), "Monday");
        for &h in hours {
            axis.add_minor_column(day, at(h, 0), at(h + 1, 0), ColumnLabels::uniform(format!("{h}")), "")
                .unwrap();
        }
        axis
    }

    #[test]
    fn test_empty_axis() {
        let axis = TimeAxis::new();
        assert!(axis.is_empty());
        assert_eq!(axis.location_to_column(0.5), None);
        assert_eq!(axis.time_at(0.5), None);
        assert_eq!(axis.range_of(at(8, 0), at(9, 0)), None);
        assert_eq!(axis.begin_time(), None);
    }

    #[test]
    fn test_add_minor_errors() {
        let mut axis = TimeAxis::new();
        let day = axis.add_major_column(ColumnLabels::default(), "");
        assert!(matches!(
            axis.add_minor_column(day, at(9, 0), at(9, 0), ColumnLabels::default(), ""),
            Err(PlannerError::EmptyColumnRange)
        ));
        assert!(matches!(
            axis.add_minor_column(MajorColumnId(5), at(9, 0), at(10, 0), ColumnLabels::default(), ""),
            Err(PlannerError::UnknownMajorColumn(5))
        ));
    }

    #[test]
    fn test_sorting_and_cache_invalidation() {
        let mut axis = TimeAxis::new();
        let afternoon = axis.add_major_column(ColumnLabels::uniform("pm"), "");
        let morning = axis.add_major_column(ColumnLabels::uniform("am"), "");
        axis.add_minor_column(afternoon, at(13, 0), at(14, 0), ColumnLabels::default(), "")
            .unwrap();
        axis.add_minor_column(morning, at(8, 0), at(9, 0), ColumnLabels::default(), "")
            .unwrap();

        let majors: Vec<_> = axis.major_columns().iter().map(|m| m.id()).collect();
        assert_eq!(majors, vec![morning, afternoon]);
        assert_eq!(axis.column_count(), 2);
        assert_eq!(axis.minor_column(0).unwrap().begin_time(), at(8, 0));

        // Cached views are rebuilt after mutation.
        axis.add_minor_column(morning, at(9, 0), at(10, 0), ColumnLabels::default(), "")
            .unwrap();
        assert_eq!(axis.column_count(), 3);
        assert_eq!(axis.minor_column(1).unwrap().begin_time(), at(9, 0));
        assert_eq!(axis.minor_column(1).unwrap().major(), morning);
        assert_eq!(axis.begin_time(), Some(at(8, 0)));
        assert_eq!(axis.end_time(), Some(at(14, 0)));
    }

    #[test]
    fn test_childless_major_sorts_last() {
        let mut axis = TimeAxis::new();
        let empty = axis.add_major_column(ColumnLabels::uniform("empty"), "");
        let full = axis.add_major_column(ColumnLabels::uniform("full"), "");
        axis.add_minor_column(full, at(8, 0), at(9, 0), ColumnLabels::default(), "")
            .unwrap();
        let majors: Vec<_> = axis.major_columns().iter().map(|m| m.id()).collect();
        assert_eq!(majors, vec![full, empty]);
    }

    #[test]
    fn test_column_index_inside_columns() {
        let axis = hourly(&[8, 9, 10]);
        assert_eq!(axis.column_index_at(at(8, 30), ColumnBoundary::Start), Some(0));
        assert_eq!(axis.column_index_at(at(9, 0), ColumnBoundary::Start), Some(1));
        assert_eq!(axis.column_index_at(at(8, 30), ColumnBoundary::End), Some(0));
        // Exclusive end at a column border belongs to the earlier column.
        assert_eq!(axis.column_index_at(at(9, 0), ColumnBoundary::End), Some(0));
        assert_eq!(axis.column_index_at(at(11, 0), ColumnBoundary::Start), None);
        assert_eq!(axis.column_index_at(at(8, 0), ColumnBoundary::End), None);
    }

    #[test]
    fn test_gap_ascription_is_asymmetric() {
        // [08:00, 09:00) and [10:00, 11:00), gap 09:00-10:00
        let axis = hourly(&[8, 10]);
        assert_eq!(axis.column_index_at(at(9, 30), ColumnBoundary::Start), Some(1));
        assert_eq!(axis.column_index_at(at(9, 45), ColumnBoundary::End), Some(0));
        assert_eq!(axis.minor_column(1).unwrap().begin_time(), at(10, 0));
        assert_eq!(axis.minor_column(0).unwrap().begin_time(), at(8, 0));

        // A booking entirely inside the gap touches no column.
        assert_eq!(axis.range_of(at(9, 30), at(9, 45)), None);
    }

    #[test]
    fn test_range_of() {
        let axis = hourly(&[8, 9, 10, 11]);
        assert_eq!(axis.range_of(at(9, 0), at(10, 0)), Some([0.25, 0.5]));
        assert_eq!(axis.range_of(at(8, 30), at(10, 30)), Some([0.0, 0.75]));
        // Clamped at the axis ends.
        assert_eq!(axis.range_of(at(6, 0), at(8, 30)), Some([0.0, 0.25]));
        assert_eq!(axis.range_of(at(11, 30), at(18, 0)), Some([0.75, 1.0]));
        // Entirely outside.
        assert_eq!(axis.range_of(at(6, 0), at(7, 0)), None);
        assert_eq!(axis.range_of(at(12, 0), at(13, 0)), None);
        assert_eq!(axis.range_of(at(10, 0), at(10, 0)), None);
    }

    #[test]
    fn test_range_spanning_gap() {
        let axis = hourly(&[8, 10]);
        assert_eq!(axis.range_of(at(8, 30), at(10, 30)), Some([0.0, 1.0]));
        // Ends inside the gap: counted up to the preceding column.
        assert_eq!(axis.range_of(at(8, 30), at(9, 30)), Some([0.0, 0.5]));
        // Starts inside the gap: counted from the following column.
        assert_eq!(axis.range_of(at(9, 30), at(10, 30)), Some([0.5, 1.0]));
    }

    #[test]
    fn test_location_to_column_clamps() {
        let axis = hourly(&[8, 9, 10, 11]);
        assert_eq!(axis.location_to_index(0.0), Some(0));
        assert_eq!(axis.location_to_index(0.3), Some(1));
        assert_eq!(axis.location_to_index(0.99), Some(3));
        assert_eq!(axis.location_to_index(1.0), Some(3));
        assert_eq!(axis.location_to_index(-0.5), Some(0));
        assert_eq!(axis.location_to_index(7.0), Some(3));
        assert_eq!(axis.location_to_index(f64::NAN), None);
    }

    #[test]
    fn test_time_at_interpolates() {
        let axis = hourly(&[8, 9, 10, 11]);
        assert_eq!(axis.time_at(0.0), Some(at(8, 0)));
        assert_eq!(axis.time_at(0.125), Some(at(8, 30)));
        assert_eq!(axis.time_at(0.5), Some(at(10, 0)));
        assert_eq!(axis.time_at(1.0), Some(at(12, 0)));
    }

    #[test]
    fn test_coordinate_round_trip() {
        // Uneven widths and a gap: coordinates stay column-count uniform.
        let mut axis = TimeAxis::new();
        let day = axis.add_major_column(ColumnLabels::default(), "");
        let spans = [(8, 9), (9, 12), (13, 14), (14, 18), (18, 19), (20, 23)];
        for (h0, h1) in spans {
            axis.add_minor_column(day, at(h0, 0), at(h1, 0), ColumnLabels::default(), "")
                .unwrap();
        }

        for (i, column) in axis.minor_columns().iter().enumerate() {
            let range = axis
                .range_of(column.begin_time(), column.end_time())
                .unwrap();
            assert_eq!(axis.column_range(i), Some(range));
            assert_eq!(axis.location_to_column(range[0] + 1e-6), Some(column));
            assert_eq!(axis.time_at(range[0]), Some(column.begin_time()));
        }
    }
}
