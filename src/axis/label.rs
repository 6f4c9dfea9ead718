//! Column and time label formatting.
//!
//! The axis itself never formats anything; the builder asks a
//! [`LabelFormatter`] for every column it creates, and the board uses the
//! same formatter for cell tooltips. Hosts plug in a locale-aware
//! implementation; [`DefaultLabelFormatter`] covers the plain English case.

use chrono::{Datelike, NaiveDateTime};

use super::column::ColumnLabels;
use crate::models::PlanningMode;

/// Supplies header texts and tooltips.
pub trait LabelFormatter {
    /// Labels and tooltip for a major column covering `[begin, end)`.
    fn major_column(
        &self,
        mode: PlanningMode,
        begin: NaiveDateTime,
        end: NaiveDateTime,
    ) -> (ColumnLabels, String);

    /// Labels and tooltip for a minor column covering `[begin, end)`.
    fn minor_column(
        &self,
        mode: PlanningMode,
        begin: NaiveDateTime,
        end: NaiveDateTime,
    ) -> (ColumnLabels, String);

    /// Text for a single instant (cell tooltips).
    fn format_time(&self, mode: PlanningMode, time: NaiveDateTime) -> String;
}

/// chrono-format based labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLabelFormatter;

impl LabelFormatter for DefaultLabelFormatter {
    fn major_column(
        &self,
        mode: PlanningMode,
        begin: NaiveDateTime,
        _end: NaiveDateTime,
    ) -> (ColumnLabels, String) {
        match mode {
            PlanningMode::Intraday => (
                ColumnLabels::new(
                    begin.format("%d.%m").to_string(),
                    begin.format("%a %d.%m").to_string(),
                    begin.format("%A, %d. %B %Y").to_string(),
                ),
                begin.format("%A, %d. %B %Y").to_string(),
            ),
            PlanningMode::Day | PlanningMode::Week => (
                ColumnLabels::new(
                    begin.format("%b").to_string(),
                    begin.format("%b %y").to_string(),
                    begin.format("%B %Y").to_string(),
                ),
                begin.format("%B %Y").to_string(),
            ),
        }
    }

    fn minor_column(
        &self,
        mode: PlanningMode,
        begin: NaiveDateTime,
        end: NaiveDateTime,
    ) -> (ColumnLabels, String) {
        match mode {
            PlanningMode::Intraday => (
                ColumnLabels::uniform(begin.format("%H:%M").to_string()),
                format!("{} - {}", begin.format("%H:%M"), end.format("%H:%M")),
            ),
            PlanningMode::Day => (
                ColumnLabels::new(
                    begin.format("%d").to_string(),
                    begin.format("%a %d").to_string(),
                    begin.format("%a %d.%m").to_string(),
                ),
                begin.format("%A, %d. %B %Y").to_string(),
            ),
            PlanningMode::Week => {
                let week = begin.iso_week().week();
                let last_day = end - chrono::Duration::days(1);
                (
                    ColumnLabels::new(
                        format!("{week}"),
                        format!("W{week}"),
                        format!("Week {week}"),
                    ),
                    format!(
                        "{} - {}",
                        begin.format("%d.%m."),
                        last_day.format("%d.%m.%Y")
                    ),
                )
            }
        }
    }

    fn format_time(&self, mode: PlanningMode, time: NaiveDateTime) -> String {
        match mode {
            PlanningMode::Intraday => time.format("%d.%m.%Y %H:%M").to_string(),
            PlanningMode::Day | PlanningMode::Week => time.format("%d.%m.%Y").to_string(),
        }
    }
}
