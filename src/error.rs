use thiserror::Error;

use crate::discovery::MethodFilteringError;

#[derive(Error, Debug)]
pub enum MarktestError {
    #[error("Method filtering error: {0}")]
    MethodFiltering(#[from] MethodFilteringError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("A capture scope is already active on this thread; tests cannot start nested test runs")]
    CaptureActive,

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for MarktestError {
    fn from(err: anyhow::Error) -> Self {
        MarktestError::Other(err.to_string())
    }
}

/// Result type for marktest crate
pub type Result<T> = std::result::Result<T, MarktestError>;
