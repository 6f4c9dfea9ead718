//! Configuration validation.
//!
//! Checks a [`BoardConfig`] before a board is built from it and reports
//! every problem at once instead of stopping at the first:
//! - Hours outside 0..=23
//! - First hour after last hour
//! - Intraday interval outside 15 minutes ..= 24 hours
//! - Work day count outside 1..=6

use std::fmt;

use crate::models::{BoardConfig, MAX_INTRADAY_INTERVAL_MS, MIN_INTRADAY_INTERVAL_MS};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// An hour of day is not within 0..=23.
    HourOutOfRange,
    /// The first visible hour lies after the last one.
    HourOrder,
    /// The intraday column width is outside the allowed range.
    IntradayIntervalOutOfRange,
    /// The work day count is not within 1..=6.
    WorkDayCountOutOfRange,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a board configuration.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_config(config: &BoardConfig) -> ValidationResult {
    let mut errors = Vec::new();

    for (name, hour) in [
        ("first_hour_of_day", config.first_hour_of_day),
        ("last_hour_of_day", config.last_hour_of_day),
    ] {
        if hour > 23 {
            errors.push(ValidationError::new(
                ValidationErrorKind::HourOutOfRange,
                format!("{name} must be within 0..=23, got {hour}"),
            ));
        }
    }

    if config.first_hour_of_day > config.last_hour_of_day {
        errors.push(ValidationError::new(
            ValidationErrorKind::HourOrder,
            format!(
                "first_hour_of_day ({}) is after last_hour_of_day ({})",
                config.first_hour_of_day, config.last_hour_of_day
            ),
        ));
    }

    if !(MIN_INTRADAY_INTERVAL_MS..=MAX_INTRADAY_INTERVAL_MS).contains(&config.intraday_interval_ms) {
        errors.push(ValidationError::new(
            ValidationErrorKind::IntradayIntervalOutOfRange,
            format!(
                "intraday_interval_ms must be between {MIN_INTRADAY_INTERVAL_MS} and {MAX_INTRADAY_INTERVAL_MS}, got {}",
                config.intraday_interval_ms
            ),
        ));
    }

    if !(1..=6).contains(&config.work_day_count) {
        errors.push(ValidationError::new(
            ValidationErrorKind::WorkDayCountOutOfRange,
            format!("work_day_count must be within 1..=6, got {}", config.work_day_count),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
