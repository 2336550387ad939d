use std::result::Result as StdResult;

use dayroll_config::ConfigError;
use dayroll_core::{CoreError, ErrorKind};
use thiserror::Error;

/// Unified error type for ledger, storage and configuration failures.
#[derive(Error, Debug)]
pub enum BudgetError {
    #[error(transparent)]
    Ledger(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Persistence error: {0}")]
    Storage(String),
}

impl BudgetError {
    /// Validation / state / storage classification, when one applies.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            BudgetError::Ledger(err) => Some(err.kind()),
            BudgetError::Storage(_) => Some(ErrorKind::Storage),
            BudgetError::Config(_) => None,
        }
    }
}

pub type Result<T> = StdResult<T, BudgetError>;

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] BudgetError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Terminal error: {0}")]
    Terminal(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for BudgetError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(io) => BudgetError::Storage(io.to_string()),
            ConfigError::Serde(message) => BudgetError::Config(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::from(BudgetError::from(err))
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::from(BudgetError::from(err))
    }
}

impl From<rustyline::error::ReadlineError> for CliError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        CliError::Terminal(err.to_string())
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(err: dialoguer::Error) -> Self {
        CliError::Terminal(err.to_string())
    }
}
