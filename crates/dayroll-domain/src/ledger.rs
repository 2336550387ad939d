//! Per-user ledger documents: months, their fixed daily entitlement and the
//! append-only log of day entries.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::month::MonthKey;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
/// Every month a single user has tracked. Persisted as one document.
pub struct UserLedger {
    /// Document revision, bumped by the store on each successful save.
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub months: BTreeMap<MonthKey, MonthRecord>,
}

impl UserLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn month(&self, key: MonthKey) -> Option<&MonthRecord> {
        self.months.get(&key)
    }

    pub fn month_mut(&mut self, key: MonthKey) -> Option<&mut MonthRecord> {
        self.months.get_mut(&key)
    }

    pub fn contains_month(&self, key: MonthKey) -> bool {
        self.months.contains_key(&key)
    }

    /// Closing balance of the month preceding `key`, or `0` when it was never tracked.
    pub fn carryover_into(&self, key: MonthKey) -> f64 {
        key.previous()
            .and_then(|previous| self.months.get(&previous))
            .map(|record| record.rolling_balance)
            .unwrap_or(0.0)
    }

    /// Most recent tracked month.
    pub fn latest_month(&self) -> Option<(MonthKey, &MonthRecord)> {
        self.months
            .iter()
            .next_back()
            .map(|(key, record)| (*key, record))
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Budget state for one calendar month.
pub struct MonthRecord {
    pub base_budget: f64,
    #[serde(default)]
    pub carryover: f64,
    pub total_budget: f64,
    /// Fixed at setup as `total_budget / days_in_month`; never recomputed.
    pub standard_daily_budget: f64,
    pub rolling_balance: f64,
    #[serde(default)]
    pub days: BTreeMap<NaiveDate, DayRecord>,
}

impl MonthRecord {
    /// Creates an empty month whose total budget includes `carryover`.
    pub fn new(key: MonthKey, base_budget: f64, carryover: f64) -> Self {
        let total_budget = base_budget + carryover;
        Self {
            base_budget,
            carryover,
            total_budget,
            standard_daily_budget: total_budget / f64::from(key.days_in_month()),
            rolling_balance: 0.0,
            days: BTreeMap::new(),
        }
    }

    /// The chronologically last entry, if any.
    pub fn last_entry(&self) -> Option<(NaiveDate, &DayRecord)> {
        self.days.iter().next_back().map(|(date, day)| (*date, day))
    }

    pub fn has_entry(&self, date: NaiveDate) -> bool {
        self.days.contains_key(&date)
    }

    pub fn total_spent(&self) -> f64 {
        self.days.values().map(|day| day.spent).sum()
    }

    /// Appends an entry and moves the rolling balance to its closing balance.
    pub fn push_entry(&mut self, date: NaiveDate, day: DayRecord) {
        self.rolling_balance = day.rolling_balance_after_spend;
        self.days.insert(date, day);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Spending recorded for one day, or for a summarized range of missed days.
pub struct DayRecord {
    pub spent: f64,
    pub available_budget_before_spend: f64,
    pub rolling_balance_after_spend: f64,
    #[serde(default)]
    pub is_summary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_period: Option<String>,
}

impl DayRecord {
    /// Entry for a single day.
    pub fn daily(available: f64, spent: f64) -> Self {
        Self {
            spent,
            available_budget_before_spend: available,
            rolling_balance_after_spend: available - spent,
            is_summary: false,
            summary_period: None,
        }
    }

    /// Entry aggregating several days into one line.
    pub fn summary(available: f64, spent: f64, period: impl Into<String>) -> Self {
        Self {
            is_summary: true,
            summary_period: Some(period.into()),
            ..Self::daily(available, spent)
        }
    }

    /// Row label: the summarized period for catch-up entries, else the day key.
    pub fn label(&self, date: NaiveDate) -> String {
        match (&self.summary_period, self.is_summary) {
            (Some(period), true) => period.clone(),
            _ => date.format("%Y-%m-%d").to_string(),
        }
    }
}
