//! dayroll-domain
//!
//! Pure data model for the daily rolling budget: user ledgers, month records,
//! day records and calendar helpers. No I/O, no CLI, no storage.

pub mod calendar;
pub mod ledger;
pub mod month;

pub use calendar::*;
pub use ledger::*;
pub use month::*;
