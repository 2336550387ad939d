#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use chrono::{Duration, NaiveDate};
use dayroll::DailyTracker;
use dayroll_core::{Clock, CoreError, LedgerStore};
use dayroll_domain::UserLedger;
use dayroll_storage_json::{JsonLedgerStore, StoragePaths};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Creates a unique directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Clock whose date the test moves forward by hand.
#[derive(Clone)]
pub struct TestClock {
    date: Arc<Mutex<NaiveDate>>,
}

impl TestClock {
    pub fn starting(date: NaiveDate) -> Self {
        Self {
            date: Arc::new(Mutex::new(date)),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        *self.date.lock().expect("clock lock") = date;
    }

    pub fn advance(&self, days: i64) {
        let mut current = self.date.lock().expect("clock lock");
        *current += Duration::days(days);
    }
}

impl Clock for TestClock {
    fn today(&self) -> NaiveDate {
        *self.date.lock().expect("clock lock")
    }
}

/// Tracker over a fresh JSON store, plus the handle that moves its clock.
pub fn json_tracker(start: NaiveDate) -> (DailyTracker, TestClock, PathBuf) {
    let base = temp_base();
    let store = JsonLedgerStore::new(StoragePaths::under(&base)).expect("create json store");
    let clock = TestClock::starting(start);
    let tracker = DailyTracker::new(Box::new(store), Box::new(clock.clone()));
    (tracker, clock, base)
}

/// Store whose saves always fail, for checking that nothing half-applies.
#[derive(Default)]
pub struct FailingStore {
    documents: Mutex<HashMap<String, UserLedger>>,
}

impl FailingStore {
    /// Seeds `user`'s document directly, bypassing `save`.
    pub fn seed(&self, user: &str, ledger: UserLedger) {
        self.documents
            .lock()
            .expect("store lock")
            .insert(user.to_string(), ledger);
    }
}

impl LedgerStore for FailingStore {
    fn load(&self, user: &str) -> Result<UserLedger, CoreError> {
        let documents = self.documents.lock().expect("store lock");
        Ok(documents.get(user).cloned().unwrap_or_default())
    }

    fn save(&self, _user: &str, _ledger: &UserLedger) -> Result<u64, CoreError> {
        Err(CoreError::Storage("disk unavailable".into()))
    }

    fn list_users(&self) -> Result<Vec<String>, CoreError> {
        Ok(Vec::new())
    }
}
