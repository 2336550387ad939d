use chrono::NaiveDate;

use dayroll_core::{BudgetService, CoreError, TrackingState};
use dayroll_domain::{MonthKey, MonthRecord};

use super::{AmountFormat, Table, TableColumn};

/// One rendered ledger line.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRow {
    /// Summary period for catch-up entries, else the day key.
    pub label: String,
    pub spent: f64,
    pub available: f64,
    pub balance_after: f64,
    pub is_summary: bool,
}

/// Everything the shell shows for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthView {
    pub month: MonthKey,
    pub base_budget: f64,
    pub carryover: f64,
    pub total_budget: f64,
    pub standard_daily_budget: f64,
    pub total_spent: f64,
    pub month_remaining: f64,
    pub rolling_balance: f64,
    /// Only present when `today` falls inside the month.
    pub available_today: Option<f64>,
    pub tracking: Option<TrackingState>,
    pub rows: Vec<DayRow>,
}

impl MonthView {
    pub fn build(key: MonthKey, record: &MonthRecord, today: NaiveDate) -> Result<Self, CoreError> {
        let (available_today, tracking) = if key.contains(today) {
            (
                Some(BudgetService::available_on(key, record, today)?),
                Some(BudgetService::tracking_state(key, record, today)?),
            )
        } else {
            (None, None)
        };
        let total_spent = record.total_spent();
        let rows = record
            .days
            .iter()
            .map(|(date, day)| DayRow {
                label: day.label(*date),
                spent: day.spent,
                available: day.available_budget_before_spend,
                balance_after: day.rolling_balance_after_spend,
                is_summary: day.is_summary,
            })
            .collect();

        Ok(Self {
            month: key,
            base_budget: record.base_budget,
            carryover: record.carryover,
            total_budget: record.total_budget,
            standard_daily_budget: record.standard_daily_budget,
            total_spent,
            month_remaining: record.total_budget - total_spent,
            rolling_balance: record.rolling_balance,
            available_today,
            tracking,
            rows,
        })
    }

    /// Two-column table of the month's headline metrics.
    pub fn metrics_table(&self, fmt: &AmountFormat) -> Table {
        let mut table = Table::new(vec![TableColumn::left("Metric"), TableColumn::right("Amount")]);
        let mut metrics = vec![
            ("Base budget", self.base_budget),
            ("Carryover", self.carryover),
            ("Total budget", self.total_budget),
            ("Daily budget", self.standard_daily_budget),
            ("Spent", self.total_spent),
            ("Remaining", self.month_remaining),
            ("Rolling balance", self.rolling_balance),
        ];
        if let Some(available) = self.available_today {
            metrics.push(("Available today", available));
        }
        for (label, amount) in metrics {
            table.push_row(vec![label.to_string(), fmt.format(amount)]);
        }
        table
    }

    /// Chronological entry table.
    pub fn entries_table(&self, fmt: &AmountFormat) -> Table {
        let mut table = Table::new(vec![
            TableColumn::left("Date").max_width(28),
            TableColumn::right("Available"),
            TableColumn::right("Spent"),
            TableColumn::right("Balance"),
        ]);
        for row in &self.rows {
            table.push_row(vec![
                row.label.clone(),
                fmt.format(row.available),
                fmt.format(row.spent),
                fmt.format(row.balance_after),
            ]);
        }
        table
    }
}
