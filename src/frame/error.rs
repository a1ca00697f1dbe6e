use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),

    #[error("Column '{column}' mixes {first} and {other} values")]
    MixedTypes {
        column: String,
        first: &'static str,
        other: &'static str,
    },

    #[error("Column '{column}' holds {value}, which is outside the representable time range")]
    OutOfRangeTime { column: String, value: i64 },
}
