//! Time-axis construction per planning mode.
//!
//! # Strategies
//!
//! | Mode | Major column | Minor column |
//! |------|--------------|--------------|
//! | Intraday | selected day | `intraday_interval` slices of `[first_hour, last_hour + 1)` |
//! | Day | calendar month | selected day |
//! | Week | calendar month (of the week start) | ISO week, 7 days or `work_day_count` days |
//!
//! The axis is always built from scratch; callers rebuild whenever an
//! input changes.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use super::column::MajorColumnId;
use super::label::LabelFormatter;
use super::time_axis::TimeAxis;
use crate::error::PlannerResult;
use crate::models::{BoardConfig, PlanningMode};

/// Builds a [`TimeAxis`] from days and planning settings.
pub struct TimeAxisBuilder<'a> {
    formatter: &'a dyn LabelFormatter,
    days: BTreeSet<NaiveDate>,
    mode: PlanningMode,
    first_hour: u32,
    last_hour: u32,
    interval_ms: i64,
    work_day_count: u32,
    work_days_only: bool,
}

impl<'a> TimeAxisBuilder<'a> {
    /// Creates a builder with default settings and no days.
    pub fn new(formatter: &'a dyn LabelFormatter) -> Self {
        Self::from_config(&BoardConfig::default(), formatter)
    }

    /// Creates a builder from board settings.
    pub fn from_config(config: &BoardConfig, formatter: &'a dyn LabelFormatter) -> Self {
        Self {
            formatter,
            days: config.days.clone(),
            mode: config.planning_mode,
            first_hour: config.first_hour_of_day,
            last_hour: config.last_hour_of_day,
            interval_ms: config.intraday_interval_ms,
            work_day_count: config.work_day_count,
            work_days_only: config.work_days_only,
        }
    }

    /// Sets the days to lay out.
    pub fn with_days(mut self, days: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.days = days.into_iter().collect();
        self
    }

    /// Sets the planning mode.
    pub fn with_mode(mut self, mode: PlanningMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets visible hours (both inclusive).
    pub fn with_hours(mut self, first: u32, last: u32) -> Self {
        self.first_hour = first;
        self.last_hour = last;
        self
    }

    /// Sets the intraday column width (ms).
    pub fn with_interval(mut self, interval_ms: i64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    /// Sets the work-week restriction for week mode.
    pub fn with_work_days(mut self, count: u32, only: bool) -> Self {
        self.work_day_count = count;
        self.work_days_only = only;
        self
    }

    /// Builds the axis.
    pub fn build(&self) -> PlannerResult<TimeAxis> {
        let mut axis = TimeAxis::new();
        match self.mode {
            PlanningMode::Intraday => self.build_intraday(&mut axis)?,
            PlanningMode::Day => self.build_days(&mut axis)?,
            PlanningMode::Week => self.build_weeks(&mut axis)?,
        }
        log::debug!(
            "built {:?} time axis: {} major / {} minor columns",
            self.mode,
            axis.major_columns().len(),
            axis.column_count()
        );
        Ok(axis)
    }

    fn build_intraday(&self, axis: &mut TimeAxis) -> PlannerResult<()> {
        let step = Duration::milliseconds(self.interval_ms.max(1));
        for day in &self.days {
            let midnight = day_start(*day);
            let bounds = (
                shift(midnight, Duration::days(1)),
                shift(midnight, Duration::hours(i64::from(self.first_hour))),
                shift(midnight, Duration::hours(i64::from(self.last_hour) + 1)),
            );
            let (Some(next_midnight), Some(mut begin), Some(end)) = bounds else {
                log::warn!("day {day} is out of range, skipped");
                continue;
            };
            let major = self.add_major(axis, midnight, next_midnight);
            while begin < end {
                let next = shift(begin, step).map_or(end, |t| t.min(end));
                self.add_minor(axis, major, begin, next)?;
                begin = next;
            }
        }
        Ok(())
    }

    fn build_days(&self, axis: &mut TimeAxis) -> PlannerResult<()> {
        let mut current: Option<((i32, u32), MajorColumnId)> = None;
        for day in &self.days {
            let begin = day_start(*day);
            let Some(end) = shift(begin, Duration::days(1)) else {
                log::warn!("day {day} is out of range, skipped");
                continue;
            };
            let major = self.month_major(axis, &mut current, *day);
            self.add_minor(axis, major, begin, end)?;
        }
        Ok(())
    }

    fn build_weeks(&self, axis: &mut TimeAxis) -> PlannerResult<()> {
        let length = if self.work_days_only {
            i64::from(self.work_day_count.max(1))
        } else {
            7
        };
        let week_starts: BTreeSet<NaiveDate> = self
            .days
            .iter()
            .filter_map(|d| {
                let monday =
                    d.checked_sub_signed(Duration::days(i64::from(d.weekday().num_days_from_monday())));
                if monday.is_none() {
                    log::warn!("week of {d} is out of range, skipped");
                }
                monday
            })
            .collect();

        let mut current = None;
        for monday in week_starts {
            let begin = day_start(monday);
            let Some(end) = shift(begin, Duration::days(length)) else {
                log::warn!("week of {monday} is out of range, skipped");
                continue;
            };
            let major = self.month_major(axis, &mut current, monday);
            self.add_minor(axis, major, begin, end)?;
        }
        Ok(())
    }

    /// Returns the major column for `day`'s month, opening a new one on change.
    fn month_major(
        &self,
        axis: &mut TimeAxis,
        current: &mut Option<((i32, u32), MajorColumnId)>,
        day: NaiveDate,
    ) -> MajorColumnId {
        let month = (day.year(), day.month());
        match current {
            Some((m, id)) if *m == month => *id,
            _ => {
                let first = day.with_day(1).unwrap_or(day);
                let next = first
                    .checked_add_months(chrono::Months::new(1))
                    .unwrap_or(first);
                let id = self.add_major(axis, day_start(first), day_start(next));
                *current = Some((month, id));
                id
            }
        }
    }

    fn add_major(
        &self,
        axis: &mut TimeAxis,
        begin: NaiveDateTime,
        end: NaiveDateTime,
    ) -> MajorColumnId {
        let (labels, tooltip) = self.formatter.major_column(self.mode, begin, end);
        axis.add_major_column(labels, tooltip)
    }

    fn add_minor(
        &self,
        axis: &mut TimeAxis,
        major: MajorColumnId,
        begin: NaiveDateTime,
        end: NaiveDateTime,
    ) -> PlannerResult<()> {
        let (labels, tooltip) = self.formatter.minor_column(self.mode, begin, end);
        axis.add_minor_column(major, begin, end, labels, tooltip)
    }
}

fn day_start(day: NaiveDate) -> NaiveDateTime {
    day.and_time(chrono::NaiveTime::MIN)
}

fn shift(time: NaiveDateTime, delta: Duration) -> Option<NaiveDateTime> {
    time.checked_add_signed(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::DefaultLabelFormatter;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(day: NaiveDate, h: u32, min: u32) -> NaiveDateTime {
        day.and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn test_intraday_hourly() {
        let f = DefaultLabelFormatter;
        let day = date(2024, 3, 4);
        let axis = TimeAxisBuilder::new(&f)
            .with_days([day])
            .with_hours(8, 16)
            .with_interval(3_600_000)
            .build()
            .unwrap();

        assert_eq!(axis.major_columns().len(), 1);
        assert_eq!(axis.column_count(), 9); // 08:00 .. 17:00
        assert_eq!(axis.begin_time(), Some(at(day, 8, 0)));
        assert_eq!(axis.end_time(), Some(at(day, 17, 0)));
        assert_eq!(axis.minor_column(0).unwrap().labels().small, "08:00");
    }

    #[test]
    fn test_intraday_last_column_clipped() {
        let f = DefaultLabelFormatter;
        let day = date(2024, 3, 4);
        // 45-minute slices of 08:00-10:00 → 08:00, 08:45, 09:30-10:00
        let axis = TimeAxisBuilder::new(&f)
            .with_days([day])
            .with_hours(8, 9)
            .with_interval(45 * 60_000)
            .build()
            .unwrap();
        assert_eq!(axis.column_count(), 3);
        let last = axis.minor_column(2).unwrap();
        assert_eq!(last.begin_time(), at(day, 9, 30));
        assert_eq!(last.end_time(), at(day, 10, 0));
    }

    #[test]
    fn test_intraday_multiple_days_leave_gaps() {
        let f = DefaultLabelFormatter;
        let (d1, d2) = (date(2024, 3, 4), date(2024, 3, 6));
        let axis = TimeAxisBuilder::new(&f)
            .with_days([d2, d1])
            .with_hours(8, 11)
            .with_interval(3_600_000)
            .build()
            .unwrap();
        assert_eq!(axis.major_columns().len(), 2);
        assert_eq!(axis.column_count(), 8);
        // Evening of d1 to morning of d2 is a gap.
        assert_eq!(axis.minor_column(3).unwrap().end_time(), at(d1, 12, 0));
        assert_eq!(axis.minor_column(4).unwrap().begin_time(), at(d2, 8, 0));
    }

    #[test]
    fn test_intraday_full_day() {
        let f = DefaultLabelFormatter;
        let day = date(2024, 3, 4);
        let axis = TimeAxisBuilder::new(&f)
            .with_days([day])
            .with_hours(0, 23)
            .with_interval(24 * 3_600_000)
            .build()
            .unwrap();
        assert_eq!(axis.column_count(), 1);
        assert_eq!(axis.end_time(), Some(at(date(2024, 3, 5), 0, 0)));
    }

    #[test]
    fn test_day_mode_groups_by_month() {
        let f = DefaultLabelFormatter;
        let axis = TimeAxisBuilder::new(&f)
            .with_mode(PlanningMode::Day)
            .with_days([date(2024, 1, 30), date(2024, 1, 31), date(2024, 2, 1)])
            .build()
            .unwrap();

        let majors = axis.major_columns();
        assert_eq!(majors.len(), 2);
        assert_eq!(majors[0].children().len(), 2);
        assert_eq!(majors[1].children().len(), 1);
        assert_eq!(majors[1].labels().large, "February 2024");
        assert_eq!(axis.column_count(), 3);
        let feb = axis.minor_column(2).unwrap();
        assert_eq!(feb.begin_time(), at(date(2024, 2, 1), 0, 0));
        assert_eq!(feb.end_time(), at(date(2024, 2, 2), 0, 0));
    }

    #[test]
    fn test_week_mode_full_weeks() {
        let f = DefaultLabelFormatter;
        // Wed and Fri of the same ISO week collapse into one column.
        let axis = TimeAxisBuilder::new(&f)
            .with_mode(PlanningMode::Week)
            .with_days([date(2024, 3, 6), date(2024, 3, 8), date(2024, 3, 12)])
            .build()
            .unwrap();
        assert_eq!(axis.column_count(), 2);
        let first = axis.minor_column(0).unwrap();
        assert_eq!(first.begin_time(), at(date(2024, 3, 4), 0, 0));
        assert_eq!(first.end_time(), at(date(2024, 3, 11), 0, 0));
        // Contiguous full weeks.
        assert_eq!(axis.minor_column(1).unwrap().begin_time(), first.end_time());
    }

    #[test]
    fn test_week_mode_work_days_only() {
        let f = DefaultLabelFormatter;
        let axis = TimeAxisBuilder::new(&f)
            .with_mode(PlanningMode::Week)
            .with_work_days(5, true)
            .with_days([date(2024, 3, 4), date(2024, 3, 11)])
            .build()
            .unwrap();
        let first = axis.minor_column(0).unwrap();
        assert_eq!(first.end_time(), at(date(2024, 3, 9), 0, 0));
        // Weekend gap before the next week.
        assert_eq!(
            axis.minor_column(1).unwrap().begin_time(),
            at(date(2024, 3, 11), 0, 0)
        );
    }

    #[test]
    fn test_week_mode_month_of_week_start() {
        let f = DefaultLabelFormatter;
        // 2024-05-01 is a Wednesday; its week starts 2024-04-29.
        let axis = TimeAxisBuilder::new(&f)
            .with_mode(PlanningMode::Week)
            .with_days([date(2024, 5, 1), date(2024, 5, 8)])
            .build()
            .unwrap();
        let majors = axis.major_columns();
        assert_eq!(majors.len(), 2);
        assert_eq!(majors[0].labels().large, "April 2024");
        assert_eq!(majors[1].labels().large, "May 2024");
    }

    #[test]
    fn test_no_days_empty_axis() {
        let f = DefaultLabelFormatter;
        for mode in [PlanningMode::Intraday, PlanningMode::Day, PlanningMode::Week] {
            let axis = TimeAxisBuilder::new(&f).with_mode(mode).build().unwrap();
            assert!(axis.is_empty());
        }
    }

    #[test]
    fn test_calendar_bounds_skipped() {
        let f = DefaultLabelFormatter;
        let day = date(2024, 3, 4);
        let days = [NaiveDate::MIN, day, NaiveDate::MAX];

        let axis = TimeAxisBuilder::new(&f)
            .with_days(days)
            .with_hours(8, 16)
            .with_interval(3_600_000)
            .build()
            .unwrap();
        assert_eq!(axis.column_count(), 18);
        assert_eq!(axis.end_time(), Some(at(day, 17, 0)));

        let axis = TimeAxisBuilder::new(&f)
            .with_mode(PlanningMode::Day)
            .with_days(days)
            .build()
            .unwrap();
        assert_eq!(axis.column_count(), 2);
        assert_eq!(axis.end_time(), Some(at(date(2024, 3, 5), 0, 0)));

        let axis = TimeAxisBuilder::new(&f)
            .with_mode(PlanningMode::Week)
            .with_days(days)
            .build()
            .unwrap();
        assert_eq!(axis.end_time(), Some(at(date(2024, 3, 11), 0, 0)));
    }
}
