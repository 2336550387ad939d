//! Calendar arithmetic shared by the month and ledger models.

use chrono::{Datelike, Duration, NaiveDate};

/// Returns the number of calendar days (28-31) in the month containing `date`.
pub fn days_in_month_of(date: NaiveDate) -> u32 {
    (28..=31)
        .rev()
        .find(|day| date.with_day(*day).is_some())
        .unwrap_or(28)
}

/// Returns the first day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

/// Whole days from `from` to `to`; negative when `to` is earlier.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Human-readable label for an inclusive date range.
pub fn period_label(start: NaiveDate, end: NaiveDate) -> String {
    if start == end {
        start.format("%Y-%m-%d").to_string()
    } else {
        format!("{} to {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month_of(date(2024, 2, 10)), 29);
        assert_eq!(days_in_month_of(date(2025, 2, 10)), 28);
        assert_eq!(days_in_month_of(date(2025, 4, 30)), 30);
        assert_eq!(days_in_month_of(date(2025, 12, 1)), 31);
    }

    #[test]
    fn first_of_month_rewinds_to_day_one() {
        assert_eq!(first_of_month(date(2025, 3, 17)), date(2025, 3, 1));
        assert_eq!(first_of_month(date(2025, 3, 1)), date(2025, 3, 1));
    }

    #[test]
    fn period_label_collapses_single_day() {
        assert_eq!(period_label(date(2025, 1, 1), date(2025, 1, 1)), "2025-01-01");
        assert_eq!(
            period_label(date(2025, 1, 3), date(2025, 1, 5)),
            "2025-01-03 to 2025-01-05"
        );
    }
}
