use std::io;

use rustyline::error::ReadlineError;

use crate::core::services::ServiceError;
use crate::errors::FinanceError;

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

/// Failure of a single command; reported and the shell keeps running.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("No user selected. Use `user <email>` first.")]
    NoUser,
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Finance(#[from] FinanceError),
    #[error("exit requested")]
    ExitRequested,
}

impl From<ServiceError> for CommandError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Finance(err) => CommandError::Finance(err),
            ServiceError::Invalid(message) => CommandError::InvalidArguments(message),
        }
    }
}

/// Failure that ends the shell.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Finance(#[from] FinanceError),
    #[error("Line editor failed: {0}")]
    Readline(#[from] ReadlineError),
    #[error(transparent)]
    Io(#[from] io::Error),
}
