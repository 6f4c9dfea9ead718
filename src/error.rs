//! Error types for planner operations.

use crate::validation::ValidationError;

/// Result type for planner operations.
pub type PlannerResult<T> = Result<T, PlannerError>;

/// Boxed error returned by pluggable hooks.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for planner operations.
///
/// Only configuration errors reach the direct caller. Hook failures are
/// routed to the board's [`ErrorSink`](crate::board::ErrorSink).
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("intraday interval must be between 15 minutes and 24 hours, got {0} ms")]
    InvalidIntradayInterval(i64),

    #[error("hour of day must be within 0..=23, got {0}")]
    InvalidHourOfDay(u32),

    #[error("first hour of day {first} is after last hour of day {last}")]
    HourOrder { first: u32, last: u32 },

    #[error("work day count must be within 1..=6, got {0}")]
    InvalidWorkDayCount(u32),

    #[error("invalid board configuration: {}", join_messages(.0))]
    InvalidConfig(Vec<ValidationError>),

    #[error("unknown major column {0}")]
    UnknownMajorColumn(usize),

    #[error("column range is empty: begin must be before end")]
    EmptyColumnRange,

    #[error("decorating cell {cell} failed: {source}")]
    Decoration {
        cell: String,
        #[source]
        source: HookError,
    },

    #[error("hook '{hook}' failed: {source}")]
    Hook {
        hook: &'static str,
        #[source]
        source: HookError,
    },
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_messages() {
        assert_eq!(
            PlannerError::InvalidHourOfDay(25).to_string(),
            "hour of day must be within 0..=23, got 25"
        );
        assert_eq!(
            PlannerError::HourOrder { first: 12, last: 9 }.to_string(),
            "first hour of day 12 is after last hour of day 9"
        );

        let err = PlannerError::InvalidConfig(vec![
            ValidationError::new(ValidationErrorKind::HourOutOfRange, "a"),
            ValidationError::new(ValidationErrorKind::HourOrder, "b"),
        ]);
        assert_eq!(err.to_string(), "invalid board configuration: a; b");
    }

    #[test]
    fn test_decoration_source() {
        let err = PlannerError::Decoration {
            cell: "(1, 2)".into(),
            source: "boom".into(),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.to_string(), "decorating cell (1, 2) failed: boom");
    }
}
