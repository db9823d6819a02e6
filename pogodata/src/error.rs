use crate::core;

use std::io;
use std::sync::Arc;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("request failed: {0}")]
    RequestFailed(Arc<reqwest::Error>),
    #[error(transparent)]
    Core(#[from] core::Error),
    #[error("not a GitHub raw content URL: {0}")]
    InvalidManifestUrl(String),
    #[error("reconciliation task failed: {0}")]
    Task(Arc<tokio::task::JoinError>),
    #[error("io operation failed: {0}")]
    Io(Arc<io::Error>),
    #[error("invalid configuration: {0}")]
    InvalidConfig(Arc<ron::error::SpannedError>),
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::RequestFailed(Arc::new(error))
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::Task(Arc::new(error))
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Self::Io(Arc::new(error))
    }
}

impl From<ron::error::SpannedError> for Error {
    fn from(error: ron::error::SpannedError) -> Self {
        Self::InvalidConfig(Arc::new(error))
    }
}
