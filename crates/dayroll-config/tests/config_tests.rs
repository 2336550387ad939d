use dayroll_config::{Config, ConfigError, ConfigManager};
use std::fs;
use tempfile::tempdir;

#[test]
fn default_config_has_usable_display_settings() {
    let cfg = Config::default();

    assert!(!cfg.currency_symbol.is_empty());
    assert_eq!(cfg.precision, 2);
    assert!(cfg.last_user.is_none());
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path()).expect("manager");

    assert_eq!(manager.load().expect("load"), Config::default());
    assert_eq!(
        manager.config_path(),
        dir.path().join("config").join("config.json")
    );
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"));

    let mut cfg = Config::default();
    cfg.currency_symbol = "$".to_string();
    cfg.precision = 0;
    cfg.last_user = Some("asha".to_string());

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
}

#[test]
fn partial_documents_fill_in_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "currency_symbol": "€" }"#).unwrap();

    let loaded = ConfigManager::new(path).load().expect("load");
    assert_eq!(loaded.currency_symbol, "€");
    assert_eq!(loaded.precision, 2);
    assert_eq!(loaded.backup_retention, 5);
}

#[test]
fn malformed_documents_are_reported() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, "precision = 2").unwrap();

    let err = ConfigManager::new(path).load().unwrap_err();
    assert!(matches!(err, ConfigError::Serde(_)));
}
