use chrono::{Local, NaiveDate};

use dayroll_core::Clock;

/// Real-time clock. Days follow the local calendar, since a "day" of
/// spending is the user's day.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
