//! Persisted client snapshot.
//!
//! Two entries live under the `docqa` namespace:
//! - `docqa.user`: `{ version, user, sessions }`
//! - `docqa.current_file`: `{ version, active_file }`
//!
//! Both are caches for restart recovery, never the source of truth. Entries
//! that fail to parse, or carry a schema version newer than this build
//! understands, are removed and treated as absent.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{ActiveFile, Session, User};

/// Key for the user + sessions entry.
pub const USER_KEY: &str = "docqa.user";

/// Key for the active file entry.
pub const CURRENT_FILE_KEY: &str = "docqa.current_file";

/// Current snapshot schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Best-effort key/value storage for snapshot entries.
pub trait SnapshotStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Stores each entry as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at `$DOCQA_HOME/state`.
    pub fn default_location() -> Self {
        Self::new(crate::config::paths::state_dir())
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("Failed to replace {}", path.display()))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }
}

/// In-process store, for tests and for running with persistence disabled.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map.
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }
}

impl<T: SnapshotStore + ?Sized> SnapshotStore for Box<T> {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Persisted `{user, sessions}` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub sessions: Vec<Session>,
}

/// Persisted active file entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveFileSnapshot {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub active_file: Option<ActiveFile>,
}

/// Why a stored entry was discarded.
#[derive(Debug)]
pub enum SnapshotError {
    Parse(serde_json::Error),
    UnsupportedVersion(u32),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Parse(e) => write!(f, "malformed snapshot: {e}"),
            SnapshotError::UnsupportedVersion(v) => {
                write!(f, "unsupported snapshot version {v} (expected <= {SCHEMA_VERSION})")
            }
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Parse(e) => Some(e),
            SnapshotError::UnsupportedVersion(_) => None,
        }
    }
}

/// Version 0 means the field was missing (pre-versioned snapshot); it is read
/// as the current schema.
fn check_version(version: u32) -> Result<(), SnapshotError> {
    if version > SCHEMA_VERSION {
        Err(SnapshotError::UnsupportedVersion(version))
    } else {
        Ok(())
    }
}

pub fn decode_user_snapshot(raw: &str) -> Result<UserSnapshot, SnapshotError> {
    let snapshot: UserSnapshot = serde_json::from_str(raw).map_err(SnapshotError::Parse)?;
    check_version(snapshot.version)?;
    Ok(snapshot)
}

pub fn decode_active_file_snapshot(raw: &str) -> Result<ActiveFileSnapshot, SnapshotError> {
    let snapshot: ActiveFileSnapshot = serde_json::from_str(raw).map_err(SnapshotError::Parse)?;
    check_version(snapshot.version)?;
    Ok(snapshot)
}

/// State recovered at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoredSnapshot {
    pub user: Option<User>,
    pub sessions: Vec<Session>,
    pub active_file: Option<ActiveFile>,
    /// Keys whose stored value was malformed and has been removed.
    pub discarded: Vec<&'static str>,
}

/// Reads both entries. Never fails: unreadable or malformed entries are
/// logged, removed, and reported in `discarded`.
pub fn restore(store: &dyn SnapshotStore) -> RestoredSnapshot {
    let mut restored = RestoredSnapshot::default();

    if let Some(raw) = read_entry(store, USER_KEY) {
        match decode_user_snapshot(&raw) {
            Ok(snapshot) => {
                restored.user = snapshot.user;
                restored.sessions = snapshot.sessions;
            }
            Err(e) => {
                warn!(key = USER_KEY, error = %e, "discarding persisted snapshot");
                discard(store, USER_KEY);
                restored.discarded.push(USER_KEY);
            }
        }
    }

    if let Some(raw) = read_entry(store, CURRENT_FILE_KEY) {
        match decode_active_file_snapshot(&raw) {
            Ok(snapshot) => restored.active_file = snapshot.active_file,
            Err(e) => {
                warn!(key = CURRENT_FILE_KEY, error = %e, "discarding persisted snapshot");
                discard(store, CURRENT_FILE_KEY);
                restored.discarded.push(CURRENT_FILE_KEY);
            }
        }
    }

    debug!(
        user = restored.user.is_some(),
        sessions = restored.sessions.len(),
        active_file = restored.active_file.is_some(),
        "restored snapshot"
    );
    restored
}

fn read_entry(store: &dyn SnapshotStore, key: &'static str) -> Option<String> {
    match store.read(key) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(key, error = %e, "failed to read persisted snapshot");
            None
        }
    }
}

fn discard(store: &dyn SnapshotStore, key: &str) {
    if let Err(e) = store.remove(key) {
        warn!(key, error = %e, "failed to remove persisted snapshot");
    }
}

/// Writes the `{user, sessions}` entry.
pub fn save_user(
    store: &dyn SnapshotStore,
    user: Option<&User>,
    sessions: &[Session],
) -> Result<()> {
    let snapshot = UserSnapshot {
        version: SCHEMA_VERSION,
        user: user.cloned(),
        sessions: sessions.to_vec(),
    };
    let raw = serde_json::to_string(&snapshot).context("Failed to serialize user snapshot")?;
    store.write(USER_KEY, &raw)
}

/// Writes the active file entry, or removes it for `None`.
pub fn save_active_file(store: &dyn SnapshotStore, active: Option<&ActiveFile>) -> Result<()> {
    let Some(active) = active else {
        return store.remove(CURRENT_FILE_KEY);
    };
    let snapshot = ActiveFileSnapshot {
        version: SCHEMA_VERSION,
        active_file: Some(active.clone()),
    };
    let raw =
        serde_json::to_string(&snapshot).context("Failed to serialize active file snapshot")?;
    store.write(CURRENT_FILE_KEY, &raw)
}

/// Removes both entries.
pub fn clear(store: &dyn SnapshotStore) -> Result<()> {
    store.remove(USER_KEY)?;
    store.remove(CURRENT_FILE_KEY)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::model::Document;

    fn user() -> User {
        User {
            id: "g-1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    fn session(id: &str) -> Session {
        Session {
            session_id: id.to_string(),
            created_at: "2024-01-01T00:00:00".to_string(),
            document: Document {
                document_id: format!("doc-{id}"),
                filename: format!("{id}.pdf"),
                file_url: String::new(),
                upload_time: None,
            },
        }
    }

    #[test]
    fn test_round_trip_through_file_store() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("state"));

        save_user(&store, Some(&user()), &[session("s1"), session("s2")]).unwrap();
        save_active_file(&store, Some(&ActiveFile::from_session(&session("s2")))).unwrap();

        let restored = restore(&store);
        assert_eq!(restored.user, Some(user()));
        assert_eq!(restored.sessions.len(), 2);
        assert_eq!(restored.active_file.unwrap().session_id, "s2");
        assert!(restored.discarded.is_empty());
    }

    #[test]
    fn test_missing_entries_restore_empty() {
        let store = MemorySnapshotStore::new();
        assert_eq!(restore(&store), RestoredSnapshot::default());
    }

    #[test]
    fn test_malformed_user_entry_is_discarded_and_removed() {
        let store = MemorySnapshotStore::new();
        store.write(USER_KEY, "{not json").unwrap();

        let restored = restore(&store);
        assert_eq!(restored.user, None);
        assert_eq!(restored.discarded, vec![USER_KEY]);
        assert_eq!(store.read(USER_KEY).unwrap(), None);
    }

    #[test]
    fn test_malformed_active_file_keeps_user() {
        let store = MemorySnapshotStore::new();
        save_user(&store, Some(&user()), &[session("s1")]).unwrap();
        store.write(CURRENT_FILE_KEY, r#"{"active_file": 5}"#).unwrap();

        let restored = restore(&store);
        assert_eq!(restored.user, Some(user()));
        assert_eq!(restored.active_file, None);
        assert_eq!(restored.discarded, vec![CURRENT_FILE_KEY]);
    }

    #[test]
    fn test_future_version_is_discarded() {
        let store = MemorySnapshotStore::new();
        store
            .write(USER_KEY, r#"{"version": 99, "user": null, "sessions": []}"#)
            .unwrap();

        let restored = restore(&store);
        assert_eq!(restored.discarded, vec![USER_KEY]);
    }

    #[test]
    fn test_unversioned_snapshot_is_accepted() {
        let store = MemorySnapshotStore::new();
        store
            .write(
                USER_KEY,
                r#"{"user": {"id": "g-1", "name": "Ada", "email": "ada@example.com"}}"#,
            )
            .unwrap();

        let restored = restore(&store);
        assert_eq!(restored.user, Some(user()));
        assert!(restored.sessions.is_empty());
    }

    #[test]
    fn test_save_active_file_none_removes_entry() {
        let store = MemorySnapshotStore::new();
        save_active_file(&store, Some(&ActiveFile::from_session(&session("s1")))).unwrap();
        save_active_file(&store, None).unwrap();
        assert_eq!(store.read(CURRENT_FILE_KEY).unwrap(), None);
    }

    #[test]
    fn test_clear_removes_both_entries() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path());
        save_user(&store, Some(&user()), &[]).unwrap();
        save_active_file(&store, Some(&ActiveFile::from_session(&session("s1")))).unwrap();

        clear(&store).unwrap();
        assert_eq!(restore(&store), RestoredSnapshot::default());
        // Clearing twice is fine.
        clear(&store).unwrap();
    }
}
