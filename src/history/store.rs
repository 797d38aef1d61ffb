//! Key-value storage behind persisted pane state.
//!
//! The core never touches storage directly; it goes through the [`Store`]
//! trait so the hosting application owns the lifecycle. A JSON-file-backed
//! implementation and an in-memory one are provided.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::Error;

/// Minimal key-value contract the core persists through. Access is assumed
/// single-writer; concurrent writers to the same key must be serialized by
/// the caller.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;
    fn delete(&self, key: &str) -> Result<(), Error>;
}

/// Global entry remembering the datasource last used across sessions.
const LAST_USED_DATASOURCE_KEY: &str = "datasource.last";

pub fn get_last_used_datasource(store: &dyn Store) -> Option<String> {
    store.get(LAST_USED_DATASOURCE_KEY)
}

pub fn set_last_used_datasource(store: &dyn Store, name: &str) -> Result<(), Error> {
    store.set(LAST_USED_DATASOURCE_KEY, name)
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), Error> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}

/// Store persisting the whole map as one JSON file, rewritten on every
/// mutation. A missing or unreadable file starts empty.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    pub fn open(path: PathBuf) -> Self {
        let entries = Self::load(&path);
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn load(path: &Path) -> HashMap<String, String> {
        let Ok(file) = File::open(path) else {
            return HashMap::new();
        };
        serde_json::from_reader(file).unwrap_or_default()
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<(), Error> {
        let write_err = |source: std::io::Error| Error::StorageWrite {
            path: self.path.display().to_string(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let file = File::create(&self.path).map_err(write_err)?;
        serde_json::to_writer(file, entries)?;
        Ok(())
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn delete(&self, key: &str) -> Result<(), Error> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        self.persist(&entries)
    }
}

/// Default on-disk location for the store.
pub fn default_store_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(
        home.join(".local")
            .join("share")
            .join("explore-state")
            .join("store.json"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_delete() {
        let store = MemoryStore::default();
        assert_eq!(store.get("k"), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
        store.delete("k").unwrap();
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn last_used_datasource_round_trip() {
        let store = MemoryStore::default();
        assert_eq!(get_last_used_datasource(&store), None);
        set_last_used_datasource(&store, "Prometheus").unwrap();
        assert_eq!(
            get_last_used_datasource(&store).as_deref(),
            Some("Prometheus")
        );
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = FileStore::open(path.clone());
        store.set("history.1", r#"[{"query":{},"ts":1}]"#).unwrap();
        drop(store);

        let reopened = FileStore::open(path);
        assert_eq!(
            reopened.get("history.1").as_deref(),
            Some(r#"[{"query":{},"ts":1}]"#)
        );
    }

    #[test]
    fn file_store_delete_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = FileStore::open(path.clone());
        store.set("a", "1").unwrap();
        store.delete("a").unwrap();
        drop(store);

        assert_eq!(FileStore::open(path).get("a"), None);
    }

    #[test]
    fn file_store_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nope.json"));
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn file_store_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();
        let store = FileStore::open(path);
        assert_eq!(store.get("anything"), None);
    }
}
