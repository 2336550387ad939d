//! Per-interaction orchestration: every operation loads the user's document,
//! applies one ledger operation to that copy and saves it back whole.

use chrono::NaiveDate;
use tracing::{info, warn};

use dayroll_core::{
    ledger_warnings, BudgetService, Clock, CoreError, LedgerStore, MonthSummary, SummaryService,
    TrackingState,
};
use dayroll_domain::{DayRecord, MonthKey, MonthRecord, UserLedger};

use crate::display::MonthView;
use crate::errors::Result;

/// Facade over a [`LedgerStore`] and a [`Clock`].
///
/// The in-memory copy of a ledger is provisional: results are returned only
/// after the store accepted the new document, so a failed save leaves the
/// stored state exactly as it was.
pub struct DailyTracker {
    store: Box<dyn LedgerStore>,
    clock: Box<dyn Clock>,
}

impl DailyTracker {
    pub fn new(store: Box<dyn LedgerStore>, clock: Box<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &dyn LedgerStore {
        self.store.as_ref()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn current_month(&self) -> MonthKey {
        MonthKey::containing(self.today())
    }

    /// Loads a user's ledger, logging any inconsistencies found in it.
    pub fn load(&self, user: &str) -> Result<UserLedger> {
        let ledger = self.store.load(user)?;
        for warning in ledger_warnings(&ledger) {
            warn!(%user, "{warning}");
        }
        Ok(ledger)
    }

    pub fn has_current_month(&self, user: &str) -> Result<bool> {
        Ok(self.load(user)?.contains_month(self.current_month()))
    }

    /// Sets this month's budget, optionally summarizing spending from the
    /// days of the month that passed before tracking started.
    pub fn set_monthly_budget(
        &self,
        user: &str,
        base_budget: f64,
        past_spending: Option<f64>,
    ) -> Result<MonthRecord> {
        let today = self.today();
        let key = MonthKey::containing(today);
        let mut ledger = self.load(user)?;
        let record =
            BudgetService::initialize_month(&mut ledger, key, base_budget, past_spending, today)?
                .clone();
        self.commit(user, &ledger)?;
        Ok(record)
    }

    pub fn available_today(&self, user: &str) -> Result<f64> {
        let today = self.today();
        let key = MonthKey::containing(today);
        let ledger = self.load(user)?;
        let month = current_record(&ledger, key, "compute available budget")?;
        Ok(BudgetService::available_on(key, month, today)?)
    }

    pub fn tracking_state(&self, user: &str) -> Result<TrackingState> {
        let today = self.today();
        let key = MonthKey::containing(today);
        let ledger = self.load(user)?;
        let month = current_record(&ledger, key, "tracking state")?;
        Ok(BudgetService::tracking_state(key, month, today)?)
    }

    pub fn record_expense(&self, user: &str, spent: f64) -> Result<DayRecord> {
        self.update_current_month(user, "record expense", |key, month, today| {
            BudgetService::record_expense(key, month, today, spent)
        })
    }

    pub fn record_missed_period(&self, user: &str, spent: f64) -> Result<DayRecord> {
        self.update_current_month(user, "record missed period", |key, month, today| {
            BudgetService::record_missed_period(key, month, today, spent)
        })
    }

    /// Summarizes `month`, defaulting to the current month.
    pub fn summarize(&self, user: &str, month: Option<MonthKey>) -> Result<MonthSummary> {
        let key = month.unwrap_or_else(|| self.current_month());
        let ledger = self.load(user)?;
        let record = current_record(&ledger, key, "summarize month")?;
        Ok(SummaryService::summarize_month(key, record)?)
    }

    /// Builds the display view for `month`, defaulting to the current month.
    pub fn month_view(&self, user: &str, month: Option<MonthKey>) -> Result<MonthView> {
        let key = month.unwrap_or_else(|| self.current_month());
        let ledger = self.load(user)?;
        let record = current_record(&ledger, key, "show month")?;
        Ok(MonthView::build(key, record, self.today())?)
    }

    /// Tracked months, oldest first, with their rolling balances.
    pub fn month_balances(&self, user: &str) -> Result<Vec<(MonthKey, f64)>> {
        Ok(self
            .load(user)?
            .months
            .iter()
            .map(|(key, record)| (*key, record.rolling_balance))
            .collect())
    }

    fn update_current_month<T>(
        &self,
        user: &str,
        operation: &'static str,
        apply: impl FnOnce(MonthKey, &mut MonthRecord, NaiveDate) -> std::result::Result<T, CoreError>,
    ) -> Result<T> {
        let today = self.today();
        let key = MonthKey::containing(today);
        let mut ledger = self.load(user)?;
        let month = ledger
            .month_mut(key)
            .ok_or(CoreError::MonthNotInitialized {
                operation,
                month: key,
            })?;
        let outcome = apply(key, month, today)?;
        self.commit(user, &ledger)?;
        Ok(outcome)
    }

    fn commit(&self, user: &str, ledger: &UserLedger) -> Result<u64> {
        let revision = self.store.save(user, ledger)?;
        info!(%user, revision, "ledger committed");
        Ok(revision)
    }
}

fn current_record<'a>(
    ledger: &'a UserLedger,
    key: MonthKey,
    operation: &'static str,
) -> std::result::Result<&'a MonthRecord, CoreError> {
    ledger.month(key).ok_or(CoreError::MonthNotInitialized {
        operation,
        month: key,
    })
}
