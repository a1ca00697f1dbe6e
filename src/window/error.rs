use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WindowError {
    #[error("Invalid calendar period '{0}', expected one of: day, week, month")]
    InvalidPeriod(String),

    #[error("Invalid calendar anchor '{0}', expected one of: current_period, previous_complete_period")]
    InvalidAnchor(String),

    #[error("Invalid completeness policy '{0}', expected one of: allow_partial, strict")]
    InvalidCompleteness(String),

    #[error("Invalid week start {0}, expected a weekday number in 1..=7 (1 = Monday)")]
    InvalidWeekStart(u8),

    #[error("Invalid window length dt = {0}, expected a finite value >= 0")]
    InvalidDt(f64),

    #[error("Invalid window phase {0}, expected a finite value")]
    InvalidPhase(f64),

    #[error("Row {step} has no usable 'date' value, required by calendar windows")]
    MissingDate { step: usize },

    #[error("No calendar period available for step {step} (period starting {period} has no predecessor)")]
    NoPeriodAvailable { step: usize, period: NaiveDate },

    #[error("Calendar period starting {period} selected for step {step} is incomplete: {seconds}s covered, {expected}s expected")]
    IncompletePeriod {
        step: usize,
        period: NaiveDate,
        seconds: f64,
        expected: f64,
    },
}
