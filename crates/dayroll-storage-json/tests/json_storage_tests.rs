use chrono::NaiveDate;
use dayroll_core::{BudgetService, CoreError, LedgerStore};
use dayroll_domain::{MonthKey, UserLedger};
use dayroll_storage_json::{encode_user_name, JsonLedgerStore, StoragePaths};
use std::fs;
use tempfile::tempdir;

fn sample_ledger() -> UserLedger {
    let key = MonthKey::new(2025, 4).unwrap();
    let today = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
    let mut ledger = UserLedger::new();
    BudgetService::initialize_month(&mut ledger, key, 3000.0, Some(450.0), today)
        .expect("initialize");
    ledger
}

#[test]
fn missing_user_loads_empty_ledger() {
    let dir = tempdir().expect("tempdir");
    let store = JsonLedgerStore::new(StoragePaths::under(dir.path())).expect("create store");

    let ledger = store.load("nobody").expect("load");
    assert!(ledger.is_empty());
    assert_eq!(ledger.revision, 0);
    assert!(store.list_users().unwrap().is_empty());
}

#[test]
fn json_store_saves_and_loads_documents() {
    let dir = tempdir().expect("tempdir");
    let store = JsonLedgerStore::new(StoragePaths::under(dir.path())).expect("create store");
    let ledger = sample_ledger();

    let revision = store.save("Asha K", &ledger).expect("save");
    assert_eq!(revision, 1);

    let loaded = store.load("Asha K").expect("load");
    assert_eq!(loaded.revision, 1);
    assert_eq!(loaded.months, ledger.months);

    let path = store.document_path("Asha K");
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("_41sha_20k.json"));
    let raw = fs::read_to_string(path).unwrap();
    assert!(raw.contains("\"2025-04\""));
    assert!(raw.contains("\"2025-04-09\""));
    assert_eq!(store.list_users().unwrap(), vec!["Asha K".to_string()]);
}

#[test]
fn stale_revision_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let store = JsonLedgerStore::new(StoragePaths::under(dir.path())).expect("create store");
    let ledger = sample_ledger();
    store.save("asha", &ledger).expect("first save");

    let err = store.save("asha", &ledger).unwrap_err();
    assert!(matches!(
        err,
        CoreError::Conflict {
            expected: 0,
            found: 1,
            ..
        }
    ));

    let fresh = store.load("asha").unwrap();
    assert_eq!(store.save("asha", &fresh).unwrap(), 2);
}

#[test]
fn overwrites_keep_rotating_backups() {
    let dir = tempdir().expect("tempdir");
    let paths = StoragePaths::under(dir.path());
    let store = JsonLedgerStore::with_retention(paths.clone(), 2).expect("create store");

    let mut ledger = sample_ledger();
    for _ in 0..4 {
        ledger.revision = store.save("asha", &ledger).expect("save");
    }

    let backups = store.list_backups("asha").expect("list backups");
    assert!(!backups.is_empty());
    assert!(backups.len() <= 2);
    for backup in &backups {
        assert!(backup.created_at.is_some(), "{}", backup.id);
        assert_eq!(
            backup.path.parent().unwrap(),
            paths.backup_root.join(encode_user_name("asha"))
        );
    }
}

#[test]
fn restoring_a_backup_bumps_the_revision() {
    let dir = tempdir().expect("tempdir");
    let store = JsonLedgerStore::new(StoragePaths::under(dir.path())).expect("create store");

    let original = sample_ledger();
    store.save("asha", &original).expect("first save");
    let mut changed = store.load("asha").unwrap();
    changed.months.clear();
    store.save("asha", &changed).expect("second save");

    let backup = store
        .list_backups("asha")
        .unwrap()
        .into_iter()
        .next()
        .expect("backup of first save");
    let restored = store.restore_backup(&backup).expect("restore");
    assert_eq!(restored.months, original.months);
    assert_eq!(restored.revision, 3);
    assert_eq!(store.load("asha").unwrap().revision, 3);
}

#[test]
fn corrupt_documents_surface_serde_errors() {
    let dir = tempdir().expect("tempdir");
    let store = JsonLedgerStore::new(StoragePaths::under(dir.path())).expect("create store");
    fs::write(store.document_path("asha"), "{ not json").unwrap();

    let err = store.load("asha").unwrap_err();
    assert!(matches!(err, CoreError::Serde(_)));
}

#[test]
fn distinct_user_names_never_share_a_document() {
    let dir = tempdir().expect("tempdir");
    let store = JsonLedgerStore::new(StoragePaths::under(dir.path())).expect("create store");
    let ledger = sample_ledger();

    for (saved, other) in [("राहुल", "प्रिया"), ("Asha K", "asha_k"), ("asha", "Asha")] {
        store.save(saved, &ledger).expect("save");
        assert_ne!(store.document_path(saved), store.document_path(other));
        let untouched = store.load(other).expect("load other user");
        assert!(untouched.is_empty(), "{other} saw {saved}'s ledger");
        assert_eq!(untouched.revision, 0);
        assert_eq!(store.save(other, &UserLedger::new()).expect("save other"), 1);
    }

    let mut users = store.list_users().unwrap();
    users.sort();
    let mut expected: Vec<String> = ["राहुल", "प्रिया", "Asha K", "asha_k", "asha", "Asha"]
        .iter()
        .map(|name| name.to_string())
        .collect();
    expected.sort();
    assert_eq!(users, expected);
}

#[test]
fn saves_within_one_second_keep_every_backup() {
    let dir = tempdir().expect("tempdir");
    let store = JsonLedgerStore::with_retention(StoragePaths::under(dir.path()), 5)
        .expect("create store");

    let mut ledger = sample_ledger();
    for _ in 0..4 {
        ledger.revision = store.save("asha", &ledger).expect("save");
    }

    let backups = store.list_backups("asha").expect("list backups");
    let revisions: Vec<Option<u64>> = backups.iter().map(|backup| backup.revision).collect();
    assert_eq!(revisions, vec![Some(3), Some(2), Some(1)]);
}

#[test]
fn held_lock_blocks_saves_until_released() {
    let dir = tempdir().expect("tempdir");
    let store = JsonLedgerStore::new(StoragePaths::under(dir.path())).expect("create store");
    let lock = dir.path().join("users").join("asha.json.lock");
    fs::write(&lock, "").unwrap();

    let err = store.save("asha", &sample_ledger()).unwrap_err();
    assert!(matches!(err, CoreError::Storage(_)));
    assert!(store.load("asha").unwrap().is_empty());

    fs::remove_file(&lock).unwrap();
    assert_eq!(store.save("asha", &sample_ledger()).unwrap(), 1);
    assert!(!lock.exists());
}

#[test]
fn concurrent_writers_of_one_revision_commit_once() {
    let dir = tempdir().expect("tempdir");
    let paths = StoragePaths::under(dir.path());
    let ledger = sample_ledger();

    let outcomes: Vec<Result<u64, CoreError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = JsonLedgerStore::new(paths.clone()).expect("create store");
                let ledger = ledger.clone();
                scope.spawn(move || store.save("asha", &ledger))
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
    for outcome in outcomes.iter().filter_map(|outcome| outcome.as_ref().err()) {
        assert!(matches!(outcome, CoreError::Conflict { found: 1, .. }), "{outcome}");
    }
    let stored = JsonLedgerStore::new(paths).unwrap().load("asha").unwrap();
    assert_eq!(stored.revision, 1);
}
