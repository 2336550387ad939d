use dayroll_domain::{MonthKey, MonthRecord};

use crate::CoreError;

/// Read-only monthly aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary {
    pub month: MonthKey,
    pub total_budget: f64,
    pub total_spent: f64,
    /// `total_budget - total_spent`.
    pub month_remaining: f64,
    /// Current rolling balance, carried into next month.
    pub rolling_balance: f64,
    /// Mean of each entry's available budget before spending.
    pub avg_daily_budget: f64,
    pub max_spent: f64,
    pub min_spent: f64,
    pub entry_count: usize,
}

pub struct SummaryService;

impl SummaryService {
    /// Aggregates the month's entries. A month without entries has no
    /// meaningful averages or extremes and is reported as an error.
    pub fn summarize_month(key: MonthKey, month: &MonthRecord) -> Result<MonthSummary, CoreError> {
        if month.days.is_empty() {
            return Err(CoreError::NoDaysRecorded(key));
        }

        let entry_count = month.days.len();
        let total_spent = month.total_spent();
        let available_sum: f64 = month
            .days
            .values()
            .map(|day| day.available_budget_before_spend)
            .sum();
        let max_spent = month
            .days
            .values()
            .map(|day| day.spent)
            .fold(f64::NEG_INFINITY, f64::max);
        let min_spent = month
            .days
            .values()
            .map(|day| day.spent)
            .fold(f64::INFINITY, f64::min);

        Ok(MonthSummary {
            month: key,
            total_budget: month.total_budget,
            total_spent,
            month_remaining: month.total_budget - total_spent,
            rolling_balance: month.rolling_balance,
            avg_daily_budget: available_sum / entry_count as f64,
            max_spent,
            min_spent,
            entry_count,
        })
    }
}
