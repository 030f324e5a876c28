use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum WorkspaceError {
    #[error("invalid condition: {0}")]
    InvalidCondition(String),

    #[error("query execution error: {0}")]
    QueryExecution(String),

    #[error("workspace source error: {0}")]
    Source(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Poisoned lock error: {0}")]
    PoisonedLock(String),
}

impl<T> From<std::sync::PoisonError<T>> for WorkspaceError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        WorkspaceError::PoisonedLock(err.to_string())
    }
}

impl From<serde_json::Error> for WorkspaceError {
    fn from(err: serde_json::Error) -> Self {
        WorkspaceError::InvalidFormat(err.to_string())
    }
}
