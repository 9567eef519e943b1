use std::result::Result as StdResult;

use thiserror::Error;

/// Error type shared by the storage, configuration, and service layers.
///
/// The projection, goal-solving, and recurring-materialization engines never
/// produce errors; they coerce their inputs instead.
#[derive(Debug, Error)]
pub enum FinanceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = StdResult<T, FinanceError>;
