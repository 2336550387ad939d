#![doc(test(attr(deny(warnings))))]

//! dayroll tracks a monthly budget as a daily rolling balance: unspent money
//! rolls into tomorrow, overspending is owed by tomorrow, and each month's
//! closing balance carries into the next.
//!
//! The accounting rules live in `dayroll-core`; this crate wires them to a
//! document store, a display layer and a command shell.

pub mod cli;
pub mod display;
pub mod errors;
pub mod tracker;
pub mod utils;

pub use tracker::DailyTracker;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("dayroll tracing initialized");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
