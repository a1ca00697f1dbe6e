use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReduceError {
    #[error("Reducer '{0}' requires per-value durations but none were supplied")]
    MissingDurations(String),
}
