use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use dayroll_domain::UserLedger;

use crate::CoreError;

/// User-keyed document store holding one [`UserLedger`] per user.
///
/// `save` is a compare-and-set on [`UserLedger::revision`]: it succeeds only
/// when the persisted revision still equals the revision the caller loaded,
/// and returns the new revision.
pub trait LedgerStore: Send + Sync {
    /// Loads the user's ledger, or an empty ledger when none exists.
    fn load(&self, user: &str) -> Result<UserLedger, CoreError>;
    /// Replaces the whole document.
    fn save(&self, user: &str, ledger: &UserLedger) -> Result<u64, CoreError>;
    fn list_users(&self) -> Result<Vec<String>, CoreError>;
}

/// Process-local store, handy for embedding and tests.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    documents: RwLock<HashMap<String, UserLedger>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> CoreError {
    CoreError::Storage("in-memory store lock poisoned".into())
}

impl LedgerStore for InMemoryLedgerStore {
    fn load(&self, user: &str) -> Result<UserLedger, CoreError> {
        let documents = self.documents.read().map_err(poisoned)?;
        Ok(documents.get(user).cloned().unwrap_or_default())
    }

    fn save(&self, user: &str, ledger: &UserLedger) -> Result<u64, CoreError> {
        let mut documents = self.documents.write().map_err(poisoned)?;
        let found = documents.get(user).map(|doc| doc.revision).unwrap_or(0);
        if found != ledger.revision {
            return Err(CoreError::Conflict {
                user: user.to_string(),
                expected: ledger.revision,
                found,
            });
        }
        let mut stored = ledger.clone();
        stored.revision = found + 1;
        documents.insert(user.to_string(), stored);
        Ok(found + 1)
    }

    fn list_users(&self) -> Result<Vec<String>, CoreError> {
        let documents = self.documents.read().map_err(poisoned)?;
        let mut users: Vec<String> = documents.keys().cloned().collect();
        users.sort();
        Ok(users)
    }
}

const BALANCE_TOLERANCE: f64 = 1e-6;

/// Detects inconsistent entries and balances within a ledger snapshot.
pub fn ledger_warnings(ledger: &UserLedger) -> Vec<String> {
    let mut warnings = Vec::new();

    for (key, month) in &ledger.months {
        for (date, day) in &month.days {
            if !key.contains(*date) {
                warnings.push(format!("{key}: entry {date} lies outside the month"));
            }
            if day.spent < 0.0 {
                warnings.push(format!("{key}: entry {date} has negative spending {}", day.spent));
            }
            let expected = day.available_budget_before_spend - day.spent;
            if (expected - day.rolling_balance_after_spend).abs() > BALANCE_TOLERANCE {
                warnings.push(format!(
                    "{key}: entry {date} closes at {} but available minus spent is {}",
                    day.rolling_balance_after_spend, expected
                ));
            }
            if day.is_summary && day.summary_period.is_none() {
                warnings.push(format!("{key}: summary entry {date} has no period label"));
            }
        }
        if let Some((date, last)) = month.last_entry() {
            if (last.rolling_balance_after_spend - month.rolling_balance).abs() > BALANCE_TOLERANCE
            {
                warnings.push(format!(
                    "{key}: rolling balance {} differs from last entry {date} ({})",
                    month.rolling_balance, last.rolling_balance_after_spend
                ));
            }
        }
    }
    warnings
}
