use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransformError {
    #[error("Invalid radiation mode '{0}', expected one of: flux_mean, energy_sum, both")]
    InvalidRadiationMode(String),

    #[error("Unsupported reducer {0}: pass a Reducer, a ReducerKind or a CustomReducer")]
    UnsupportedReducer(String),

    #[error("Unsupported transform rule: {0}")]
    UnsupportedShape(String),
}
