//! Rolling-balance rules: month setup, today's entitlement, daily expenses and
//! catch-up entries for missed days.

use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, info};

use dayroll_domain::{days_between, period_label, DayRecord, MonthKey, MonthRecord, UserLedger};

use crate::CoreError;

const OP_INITIALIZE: &str = "initialize month";
const OP_AVAILABLE: &str = "compute available budget";
const OP_EXPENSE: &str = "record expense";
const OP_MISSED: &str = "record missed period";

/// Where a month's log currently stands relative to a given day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerPosition {
    /// Date of the last entry, or the day before the 1st when nothing is recorded.
    pub last_entry_date: NaiveDate,
    /// Closing balance of the last entry, `0` when nothing is recorded.
    pub last_balance: f64,
    /// Whole days between `last_entry_date` and the reference day.
    pub days_elapsed: i64,
}

impl LedgerPosition {
    /// Balance plus the entitlement accrued since the last entry.
    pub fn available(&self, standard_daily_budget: f64) -> f64 {
        self.last_balance + self.days_elapsed as f64 * standard_daily_budget
    }
}

/// Whether a month can take today's expense directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingState {
    UpToDate,
    /// `missed_days` full days before today have no entry.
    Behind { missed_days: i64 },
}

/// Stateless accounting operations over [`UserLedger`] and [`MonthRecord`] values.
pub struct BudgetService;

impl BudgetService {
    /// Creates the month's record, folding in the previous month's closing
    /// balance and optionally summarizing spending from earlier this month.
    pub fn initialize_month(
        ledger: &mut UserLedger,
        key: MonthKey,
        base_budget: f64,
        past_spending: Option<f64>,
        today: NaiveDate,
    ) -> Result<&MonthRecord, CoreError> {
        if ledger.contains_month(key) {
            return Err(CoreError::MonthExists(key));
        }
        if !base_budget.is_finite() || base_budget <= 0.0 {
            return Err(CoreError::InvalidAmount {
                operation: OP_INITIALIZE,
                field: "base budget",
                requirement: "greater than zero",
                value: base_budget,
            });
        }
        if let Some(past) = past_spending {
            ensure_non_negative(OP_INITIALIZE, "past spending", past)?;
            if !key.contains(today) {
                return Err(CoreError::PastSpendingOutsideMonth { month: key, today });
            }
        }

        let carryover = ledger.carryover_into(key);
        let mut record = MonthRecord::new(key, base_budget, carryover);

        match past_spending {
            Some(past) if today.day() > 1 => {
                let yesterday = today - Duration::days(1);
                let available = record.standard_daily_budget * f64::from(yesterday.day());
                let entry = DayRecord::summary(
                    available,
                    past,
                    period_label(key.first_day(), yesterday),
                );
                record.push_entry(yesterday, entry);
            }
            Some(_) => debug!(month = %key, "no earlier days to cover on the 1st, past spending ignored"),
            None => {}
        }

        info!(
            month = %key,
            base_budget,
            carryover,
            total_budget = record.total_budget,
            standard_daily_budget = record.standard_daily_budget,
            "month initialized"
        );
        Ok(ledger.months.entry(key).or_insert(record))
    }

    /// Locates the month's last entry relative to `today`.
    pub fn position(
        key: MonthKey,
        month: &MonthRecord,
        today: NaiveDate,
    ) -> Result<LedgerPosition, CoreError> {
        Self::position_for(OP_AVAILABLE, key, month, today)
    }

    /// Today's available budget: last closing balance plus one standard daily
    /// budget per day elapsed since that entry. May be negative.
    pub fn available_on(
        key: MonthKey,
        month: &MonthRecord,
        today: NaiveDate,
    ) -> Result<f64, CoreError> {
        let position = Self::position(key, month, today)?;
        let available = position.available(month.standard_daily_budget);
        debug!(month = %key, %today, days_elapsed = position.days_elapsed, available, "available budget");
        Ok(available)
    }

    pub fn tracking_state(
        key: MonthKey,
        month: &MonthRecord,
        today: NaiveDate,
    ) -> Result<TrackingState, CoreError> {
        let position = Self::position(key, month, today)?;
        Ok(if position.days_elapsed > 1 {
            TrackingState::Behind {
                missed_days: position.days_elapsed - 1,
            }
        } else {
            TrackingState::UpToDate
        })
    }

    /// Records today's spending. Only allowed while the month is up to date;
    /// a day can be recorded once.
    pub fn record_expense(
        key: MonthKey,
        month: &mut MonthRecord,
        today: NaiveDate,
        spent: f64,
    ) -> Result<DayRecord, CoreError> {
        ensure_non_negative(OP_EXPENSE, "spent", spent)?;
        let position = Self::position_for(OP_EXPENSE, key, month, today)?;
        if month.has_entry(today) {
            return Err(CoreError::DayAlreadyRecorded {
                operation: OP_EXPENSE,
                date: today,
            });
        }
        if position.days_elapsed > 1 {
            return Err(CoreError::BehindSchedule {
                last_entry: position.last_entry_date,
                days_missed: position.days_elapsed - 1,
            });
        }

        let available = position.available(month.standard_daily_budget);
        let entry = DayRecord::daily(available, spent);
        month.push_entry(today, entry.clone());
        info!(
            month = %key,
            %today,
            spent,
            available,
            balance = entry.rolling_balance_after_spend,
            "expense recorded"
        );
        Ok(entry)
    }

    /// Summarizes the unrecorded days before `today` into one entry keyed at
    /// yesterday. Today itself stays open for [`BudgetService::record_expense`].
    pub fn record_missed_period(
        key: MonthKey,
        month: &mut MonthRecord,
        today: NaiveDate,
        total_spent_during_gap: f64,
    ) -> Result<DayRecord, CoreError> {
        ensure_non_negative(OP_MISSED, "spent during the gap", total_spent_during_gap)?;
        let position = Self::position_for(OP_MISSED, key, month, today)?;
        if position.days_elapsed <= 1 {
            return Err(CoreError::NotBehind {
                last_entry: position.last_entry_date,
                today,
            });
        }

        let missed_days = position.days_elapsed - 1;
        let budget_for_missed_period = month.standard_daily_budget * missed_days as f64;
        let available_for_period = position.last_balance + budget_for_missed_period;
        let start = position.last_entry_date + Duration::days(1);
        let end = today - Duration::days(1);
        let entry = DayRecord::summary(
            available_for_period,
            total_spent_during_gap,
            period_label(start, end),
        );
        month.push_entry(end, entry.clone());
        info!(
            month = %key,
            %start,
            %end,
            missed_days,
            spent = total_spent_during_gap,
            balance = entry.rolling_balance_after_spend,
            "missed period recorded"
        );
        Ok(entry)
    }

    fn position_for(
        operation: &'static str,
        key: MonthKey,
        month: &MonthRecord,
        today: NaiveDate,
    ) -> Result<LedgerPosition, CoreError> {
        if !key.contains(today) {
            return Err(CoreError::DateOutsideMonth {
                operation,
                month: key,
                date: today,
            });
        }
        let (last_entry_date, last_balance) = match month.last_entry() {
            Some((date, entry)) => (date, entry.rolling_balance_after_spend),
            None => (
                key.first_day().pred_opt().unwrap_or(key.first_day()),
                0.0,
            ),
        };
        let days_elapsed = days_between(last_entry_date, today);
        if days_elapsed < 0 {
            return Err(CoreError::DateBeforeLastEntry {
                operation,
                last_entry: last_entry_date,
                today,
            });
        }
        Ok(LedgerPosition {
            last_entry_date,
            last_balance,
            days_elapsed,
        })
    }
}

fn ensure_non_negative(
    operation: &'static str,
    field: &'static str,
    value: f64,
) -> Result<(), CoreError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CoreError::InvalidAmount {
            operation,
            field,
            requirement: "a non-negative number",
            value,
        })
    }
}
