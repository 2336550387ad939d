//! dayroll-storage-json
//!
//! Filesystem-backed [`LedgerStore`]: one pretty-printed JSON document per
//! user, written through a temp file and rename, with rotating backups of
//! the previous document.
//!
//! File names are a reversible encoding of the trimmed user name (see
//! [`encode_user_name`]), so two distinct names never share a document.
//! Saves hold a `<document>.lock` file for the duration of the
//! compare-and-set, which serializes writers across processes sharing the
//! data directory.

use std::{
    cmp::Reverse,
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use chrono::{DateTime, NaiveDateTime, Utc};
use dayroll_core::{CoreError, LedgerStore};
use dayroll_domain::UserLedger;
use tracing::{debug, info, warn};

const DOCUMENT_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const LOCK_SUFFIX: &str = "lock";
const LOCK_ATTEMPTS: u32 = 100;
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(20);
/// A lock file older than this is left over from a crashed session.
const STALE_LOCK_AFTER: Duration = Duration::from_secs(30);
pub const DEFAULT_RETENTION: usize = 5;

/// Directories used by [`JsonLedgerStore`].
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub users_root: PathBuf,
    pub backup_root: PathBuf,
}

impl StoragePaths {
    /// `<base>/users` and `<base>/backups`.
    pub fn under(base: &Path) -> Self {
        Self {
            users_root: base.join("users"),
            backup_root: base.join("backups"),
        }
    }
}

/// Describes one persisted backup of a user document.
#[derive(Debug, Clone)]
pub struct BackupInfo {
    /// Exact user name the backup belongs to.
    pub user: String,
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    /// Revision of the document that was backed up.
    pub revision: Option<u64>,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct JsonLedgerStore {
    users_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonLedgerStore {
    pub fn new(paths: StoragePaths) -> Result<Self, CoreError> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    pub fn with_retention(paths: StoragePaths, retention: usize) -> Result<Self, CoreError> {
        fs::create_dir_all(&paths.users_root)?;
        fs::create_dir_all(&paths.backup_root)?;
        Ok(Self {
            users_dir: paths.users_root,
            backups_dir: paths.backup_root,
            retention: retention.max(1),
        })
    }

    pub fn document_path(&self, user: &str) -> PathBuf {
        self.users_dir
            .join(format!("{}.{}", encode_user_name(user), DOCUMENT_EXTENSION))
    }

    /// Backups of `user`'s document, newest first.
    pub fn list_backups(&self, user: &str) -> Result<Vec<BackupInfo>, CoreError> {
        let dir = self.backup_dir(user);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                let (created_at, revision) = parse_backup_name(file_name);
                entries.push(BackupInfo {
                    user: user.trim().to_string(),
                    id: file_name.to_string(),
                    created_at,
                    revision,
                    path: path.clone(),
                });
            }
        }
        entries.sort_by_key(|info| Reverse((info.created_at, info.revision)));
        Ok(entries)
    }

    /// Makes a backup the user's current document. The restored document
    /// takes a fresh revision so sessions holding older copies conflict.
    pub fn restore_backup(&self, backup: &BackupInfo) -> Result<UserLedger, CoreError> {
        if !backup.path.exists() {
            return Err(CoreError::Storage(format!(
                "backup `{}` not found",
                backup.id
            )));
        }
        let _lock = self.lock_document(&backup.user)?;
        let current_revision = self.stored_revision(&backup.user)?;
        let mut restored = read_document(&backup.path)?;
        restored.revision = current_revision + 1;
        self.write_document(&backup.user, &restored, current_revision)?;
        info!(user = %backup.user, backup = %backup.id, "backup restored");
        Ok(restored)
    }

    fn backup_dir(&self, user: &str) -> PathBuf {
        self.backups_dir.join(encode_user_name(user))
    }

    fn lock_document(&self, user: &str) -> Result<DocumentLock, CoreError> {
        let path = self.document_path(user);
        let mut lock_path = path.into_os_string();
        lock_path.push(format!(".{LOCK_SUFFIX}"));
        DocumentLock::acquire(PathBuf::from(lock_path))
    }

    fn stored_revision(&self, user: &str) -> Result<u64, CoreError> {
        let path = self.document_path(user);
        if !path.exists() {
            return Ok(0);
        }
        Ok(read_document(&path)?.revision)
    }

    /// Replaces the document; `previous_revision` tags the backup of the
    /// file being replaced.
    fn write_document(
        &self,
        user: &str,
        ledger: &UserLedger,
        previous_revision: u64,
    ) -> Result<(), CoreError> {
        let path = self.document_path(user);
        if path.exists() {
            self.backup_existing_file(user, &path, previous_revision)?;
        }
        let tmp = tmp_path(&path);
        write_file(&tmp, &serialize_ledger(ledger)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn backup_existing_file(
        &self,
        user: &str,
        path: &Path,
        revision: u64,
    ) -> Result<(), CoreError> {
        let dir = self.backup_dir(user);
        fs::create_dir_all(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let file_name = format!(
            "{}_{}_r{}.{}",
            encode_user_name(user),
            timestamp,
            revision,
            DOCUMENT_EXTENSION
        );
        fs::copy(path, dir.join(&file_name))?;
        self.prune_backups(user)
    }

    fn prune_backups(&self, user: &str) -> Result<(), CoreError> {
        for stale in self.list_backups(user)?.into_iter().skip(self.retention) {
            debug!(backup = %stale.id, "pruning backup");
            fs::remove_file(stale.path)?;
        }
        Ok(())
    }
}

impl LedgerStore for JsonLedgerStore {
    fn load(&self, user: &str) -> Result<UserLedger, CoreError> {
        let path = self.document_path(user);
        if !path.exists() {
            debug!(%user, "no stored ledger, starting empty");
            return Ok(UserLedger::new());
        }
        read_document(&path)
    }

    fn save(&self, user: &str, ledger: &UserLedger) -> Result<u64, CoreError> {
        let _lock = self.lock_document(user)?;
        let found = self.stored_revision(user)?;
        if found != ledger.revision {
            return Err(CoreError::Conflict {
                user: user.to_string(),
                expected: ledger.revision,
                found,
            });
        }
        let mut next = ledger.clone();
        next.revision = found + 1;
        self.write_document(user, &next, found)?;
        debug!(%user, revision = next.revision, "ledger saved");
        Ok(next.revision)
    }

    fn list_users(&self) -> Result<Vec<String>, CoreError> {
        if !self.users_dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.users_dir)? {
            let path = entry?.path();
            if !path.is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some(DOCUMENT_EXTENSION)
            {
                continue;
            }
            let stem = path.file_stem().and_then(|stem| stem.to_str());
            match stem.and_then(decode_user_name) {
                Some(name) => names.push(name),
                None => warn!(path = %path.display(), "skipping unrecognized document name"),
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Exclusive `create_new` lock file, removed on drop.
struct DocumentLock {
    path: PathBuf,
}

impl DocumentLock {
    fn acquire(path: PathBuf) -> Result<Self, CoreError> {
        for _ in 0..LOCK_ATTEMPTS {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(Self { path }),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    if is_stale(&path) {
                        warn!(path = %path.display(), "removing stale document lock");
                        let _ = fs::remove_file(&path);
                    } else {
                        thread::sleep(LOCK_RETRY_DELAY);
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(CoreError::Storage(format!(
            "`{}` is held by another session",
            path.display()
        )))
    }
}

impl Drop for DocumentLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn is_stale(path: &Path) -> bool {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|modified| modified.elapsed().ok())
        .is_some_and(|age| age > STALE_LOCK_AFTER)
}

/// File-safe, reversible form of a user name.
///
/// The name is trimmed, then `a-z`, `0-9` and `-` are kept and every other
/// UTF-8 byte becomes `_xx` (lowercase hex). `Asha K` becomes `_41sha_20k`
/// and `asha_k` becomes `asha_5fk`. An empty name is `_`.
pub fn encode_user_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return "_".into();
    }
    let mut encoded = String::with_capacity(trimmed.len());
    for byte in trimmed.bytes() {
        match byte {
            b'a'..=b'z' | b'0'..=b'9' | b'-' => encoded.push(char::from(byte)),
            _ => encoded.push_str(&format!("_{byte:02x}")),
        }
    }
    encoded
}

/// Inverse of [`encode_user_name`]; `None` for names it never produces.
pub fn decode_user_name(encoded: &str) -> Option<String> {
    if encoded == "_" {
        return Some(String::new());
    }
    let raw = encoded.as_bytes();
    let mut bytes = Vec::with_capacity(raw.len());
    let mut idx = 0;
    while idx < raw.len() {
        match raw[idx] {
            b'_' => {
                let hex = encoded.get(idx + 1..idx + 3)?;
                if !hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
                    return None;
                }
                bytes.push(u8::from_str_radix(hex, 16).ok()?);
                idx += 3;
            }
            b @ (b'a'..=b'z' | b'0'..=b'9' | b'-') => {
                bytes.push(b);
                idx += 1;
            }
            _ => return None,
        }
    }
    String::from_utf8(bytes).ok()
}

/// Reads `<user>_<YYYYMMDD>_<HHMMSS>_r<revision>.json`. Names without the
/// revision segment still yield their timestamp.
fn parse_backup_name(name: &str) -> (Option<DateTime<Utc>>, Option<u64>) {
    let Some(trimmed) = name.strip_suffix(&format!(".{}", DOCUMENT_EXTENSION)) else {
        return (None, None);
    };
    let mut segments: Vec<&str> = trimmed.rsplitn(4, '_').collect();
    let revision = segments
        .first()
        .and_then(|last| last.strip_prefix('r'))
        .and_then(|digits| digits.parse::<u64>().ok());
    if revision.is_some() {
        segments.remove(0);
    }
    let created_at = match segments.as_slice() {
        [time, date, ..] if is_digits(date, 8) && is_digits(time, 6) => {
            NaiveDateTime::parse_from_str(&format!("{date}{time}"), "%Y%m%d%H%M%S")
                .ok()
                .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
        }
        _ => None,
    };
    (created_at, revision)
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_file(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

fn read_document(path: &Path) -> Result<UserLedger, CoreError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
}

fn serialize_ledger(ledger: &UserLedger) -> Result<String, CoreError> {
    serde_json::to_string_pretty(ledger).map_err(|err| CoreError::Serde(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_names_encode_reversibly() {
        for name in ["asha", "Asha K", "asha_k", "राहुल", "प्रिया", "_", "a-b", ""] {
            let encoded = encode_user_name(name);
            assert!(encoded
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_'));
            assert_eq!(decode_user_name(&encoded).as_deref(), Some(name), "{encoded}");
        }
        assert_eq!(encode_user_name("Asha K"), "_41sha_20k");
        assert_eq!(encode_user_name("asha_k"), "asha_5fk");
        assert_eq!(encode_user_name("  asha "), "asha");
        assert_eq!(decode_user_name("asha_zz"), None);
        assert_eq!(decode_user_name("Asha"), None);
    }

    #[test]
    fn backup_names_carry_timestamp_and_revision() {
        let (created, revision) = parse_backup_name("asha_5fk_20250401_093000_r7.json");
        assert_eq!(revision, Some(7));
        assert_eq!(
            created.map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string()),
            Some("2025-04-01 09:30:00".to_string())
        );
        let (created, revision) = parse_backup_name("asha_20250401_093000.json");
        assert!(created.is_some());
        assert_eq!(revision, None);
    }
}
