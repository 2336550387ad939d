//! dayroll-core
//!
//! Rolling-balance accounting engine for the daily budget tracker.
//! Depends on dayroll-domain. No CLI, no terminal I/O, no filesystem access.

pub mod budget_service;
pub mod error;
pub mod storage;
pub mod summary_service;
pub mod time;

pub use budget_service::*;
pub use error::{CoreError, ErrorKind};
pub use storage::{ledger_warnings, InMemoryLedgerStore, LedgerStore};
pub use summary_service::*;
pub use time::{Clock, FixedClock};
