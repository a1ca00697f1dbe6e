use crate::config::error::ConfigError;
use crate::frame::error::FrameError;
use crate::reducers::error::ReduceError;
use crate::transforms::error::TransformError;
use crate::window::error::WindowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SamplerError {
    #[error(transparent)]
    Window(#[from] WindowError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Reduce(#[from] ReduceError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Step {step} is out of range for a source table of {len} rows (steps start at 1)")]
    StepOutOfRange { step: usize, len: usize },

    #[error("Anchor row {step} has no '{variable}' and no transform produced it")]
    MissingRequiredVariable { variable: String, step: usize },
}
