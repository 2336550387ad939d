use std::io;

use chrono::NaiveDate;
use dayroll_domain::MonthKey;
use thiserror::Error;

/// Coarse classification of [`CoreError`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input, rejected before any mutation.
    Validation,
    /// The operation is not allowed in the month's current tracking state.
    State,
    /// The storage collaborator failed.
    Storage,
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{operation}: {field} must be {requirement}, got {value}")]
    InvalidAmount {
        operation: &'static str,
        field: &'static str,
        requirement: &'static str,
        value: f64,
    },
    #[error("initialize month: budget for {0} is already set")]
    MonthExists(MonthKey),
    #[error("{operation}: {date} is already recorded")]
    DayAlreadyRecorded {
        operation: &'static str,
        date: NaiveDate,
    },
    #[error("{operation}: {date} is outside {month}")]
    DateOutsideMonth {
        operation: &'static str,
        month: MonthKey,
        date: NaiveDate,
    },
    #[error("initialize month: past spending only applies to the current month, {today} is outside {month}")]
    PastSpendingOutsideMonth { month: MonthKey, today: NaiveDate },
    #[error("{operation}: no budget has been set for {month}")]
    MonthNotInitialized {
        operation: &'static str,
        month: MonthKey,
    },
    #[error("record expense: {days_missed} day(s) since {last_entry} are unrecorded; record the missed period first")]
    BehindSchedule {
        last_entry: NaiveDate,
        days_missed: i64,
    },
    #[error("record missed period: nothing is missing between {last_entry} and {today}")]
    NotBehind {
        last_entry: NaiveDate,
        today: NaiveDate,
    },
    #[error("summarize month: no days recorded for {0}")]
    NoDaysRecorded(MonthKey),
    #[error("{operation}: {today} is before the last recorded entry {last_entry}")]
    DateBeforeLastEntry {
        operation: &'static str,
        last_entry: NaiveDate,
        today: NaiveDate,
    },
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("save conflict for `{user}`: expected revision {expected}, found {found}")]
    Conflict {
        user: String,
        expected: u64,
        found: u64,
    },
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidAmount { .. }
            | CoreError::MonthExists(_)
            | CoreError::DayAlreadyRecorded { .. }
            | CoreError::DateOutsideMonth { .. }
            | CoreError::PastSpendingOutsideMonth { .. } => ErrorKind::Validation,
            CoreError::MonthNotInitialized { .. }
            | CoreError::BehindSchedule { .. }
            | CoreError::NotBehind { .. }
            | CoreError::NoDaysRecorded(_)
            | CoreError::DateBeforeLastEntry { .. } => ErrorKind::State,
            CoreError::Storage(_)
            | CoreError::Serde(_)
            | CoreError::Io(_)
            | CoreError::Conflict { .. } => ErrorKind::Storage,
        }
    }
}
