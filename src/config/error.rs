use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Invalid sampler config")]
    Parse(#[from] serde_json::Error),
}
