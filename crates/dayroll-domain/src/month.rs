//! Month identifiers used as ledger keys.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::calendar::{days_in_month_of, first_of_month};

/// A calendar month, rendered and persisted as `YYYY-MM`.
///
/// Ordering is chronological, so a `BTreeMap<MonthKey, _>` iterates months
/// from oldest to newest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    first: NaiveDate,
}

impl MonthKey {
    /// Builds a key for `year`/`month`; `None` when the month is out of range.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    /// The month that contains `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: first_of_month(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first + Duration::days(i64::from(self.days_in_month()) - 1)
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month_of(self.first)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first && date <= self.last_day()
    }

    /// The month before this one, rolling back across January.
    pub fn previous(&self) -> Option<Self> {
        self.first.pred_opt().map(Self::containing)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Errors produced when parsing a `YYYY-MM` month key.
pub struct MonthKeyError {
    input: String,
}

impl fmt::Display for MonthKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a month key (expected YYYY-MM)", self.input)
    }
}

impl std::error::Error for MonthKeyError {}

impl FromStr for MonthKey {
    type Err = MonthKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || MonthKeyError {
            input: value.to_string(),
        };
        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        MonthKey::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for MonthKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_and_parses_zero_padded_keys() {
        let key = MonthKey::new(2025, 3).unwrap();
        assert_eq!(key.to_string(), "2025-03");
        assert_eq!("2025-03".parse::<MonthKey>().unwrap(), key);
        assert_eq!("2025-3".parse::<MonthKey>().unwrap(), key);
        assert!("2025-13".parse::<MonthKey>().is_err());
        assert!("march".parse::<MonthKey>().is_err());
    }

    #[test]
    fn previous_crosses_year_boundaries() {
        let january = MonthKey::new(2025, 1).unwrap();
        assert_eq!(january.previous(), MonthKey::new(2024, 12));
        assert_eq!(MonthKey::new(2025, 3).unwrap().previous(), MonthKey::new(2025, 2));
    }

    #[test]
    fn bounds_follow_the_calendar() {
        let february = MonthKey::new(2024, 2).unwrap();
        assert_eq!(february.days_in_month(), 29);
        assert_eq!(
            february.last_day(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(february.contains(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert!(!february.contains(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
    }

    #[test]
    fn serializes_as_plain_string() {
        let key = MonthKey::new(2025, 11).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"2025-11\"");
        let back: MonthKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
