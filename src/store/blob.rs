//! Whole-blob key/value storage with the same contract as browser local
//! storage: one JSON document per fixed key, no schema versioning, and no
//! merge semantics beyond whole-array replacement or id-filtered deletion.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use super::StorageError;

pub const SAVED_ANALYSES_KEY: &str = "vanguardista-saved-analyses";
pub const KEYWORD_TAGS_KEY: &str = "vanguardista-keyword-tags";
pub const CATEGORIES_KEY: &str = "vanguardista-keyword-categories";
pub const USERS_KEY: &str = "vanguardista-users";

pub trait BlobStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// ── In-Memory ─────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    entries: Mutex<HashMap<String, String>>,
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError("Blob store lock poisoned".into()))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError("Blob store lock poisoned".into()))?
            .remove(key);
        Ok(())
    }
}

// ── Directory-Backed ──────────────────────────────────

/// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct DirBlobStore {
    dir: PathBuf,
}

impl DirBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError(format!("Invalid storage key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl BlobStore for DirBlobStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key).ok()?;
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("Could not read {}: {}", path.display(), e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.persist(&path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ── Typed Views ───────────────────────────────────────

/// Anything stored in a [`Collection`] is addressed by a string id.
pub trait Record: Serialize + DeserializeOwned {
    fn id(&self) -> &str;
}

/// A JSON array of `T` under one key.
pub struct Collection<T> {
    store: Arc<dyn BlobStore>,
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> Collection<T> {
    pub fn new(store: Arc<dyn BlobStore>, key: &'static str) -> Self {
        Self {
            store,
            key,
            _marker: PhantomData,
        }
    }

    /// Malformed stored JSON resets to empty rather than propagating.
    pub fn load_all(&self) -> Vec<T> {
        let Some(text) = self.store.get(self.key) else {
            return vec![];
        };
        match serde_json::from_str(&text) {
            Ok(items) => items,
            Err(e) => {
                log::warn!("Discarding malformed data under '{}': {}", self.key, e);
                vec![]
            }
        }
    }

    pub fn find(&self, id: &str) -> Option<T> {
        self.load_all().into_iter().find(|item| item.id() == id)
    }

    pub fn replace_all(&self, items: &[T]) -> Result<(), StorageError> {
        let text = serde_json::to_string(items)?;
        self.store.set(self.key, &text)
    }

    /// Replace the item with the same id, or append.
    pub fn upsert(&self, item: T) -> Result<(), StorageError> {
        let mut items = self.load_all();
        match items.iter_mut().find(|i| i.id() == item.id()) {
            Some(slot) => *slot = item,
            None => items.push(item),
        }
        self.replace_all(&items)
    }

    /// Returns whether anything was removed.
    pub fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let mut items = self.load_all();
        let before = items.len();
        items.retain(|i| i.id() != id);
        if items.len() == before {
            return Ok(false);
        }
        self.replace_all(&items)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::{AnalysisKind, SavedAnalysis};
    use serde_json::json;

    fn analyses(store: Arc<dyn BlobStore>) -> Collection<SavedAnalysis> {
        Collection::new(store, SAVED_ANALYSES_KEY)
    }

    #[test]
    fn delete_removes_exactly_one_entry() {
        let col = analyses(Arc::new(MemoryBlobStore::default()));
        let a = SavedAnalysis::new(AnalysisKind::Intent, "A", "tarot", vec![json!({"keyword": "x"})]);
        let b = SavedAnalysis::new(AnalysisKind::Cluster, "B", "sage", vec![]);
        let c = SavedAnalysis::new(AnalysisKind::Intent, "C", "moon", vec![json!(1)]);
        col.replace_all(&[a.clone(), b.clone(), c.clone()]).unwrap();

        assert!(col.delete(&b.id).unwrap());
        assert_eq!(col.load_all(), vec![a, c]);
        assert!(!col.delete(&b.id).unwrap());
    }

    #[test]
    fn upsert_replaces_by_id() {
        let col = analyses(Arc::new(MemoryBlobStore::default()));
        let mut a = SavedAnalysis::new(AnalysisKind::Intent, "A", "tarot", vec![]);
        col.upsert(a.clone()).unwrap();
        a.name = "Renamed".into();
        col.upsert(a.clone()).unwrap();
        assert_eq!(col.load_all(), vec![a]);
    }

    #[test]
    fn malformed_blob_reads_as_empty() {
        let store = Arc::new(MemoryBlobStore::default());
        store.set(SAVED_ANALYSES_KEY, "[{oops").unwrap();
        let col = analyses(store);
        assert!(col.load_all().is_empty());

        col.upsert(SavedAnalysis::new(AnalysisKind::Cluster, "n", "k", vec![])).unwrap();
        assert_eq!(col.load_all().len(), 1);
    }

    #[test]
    fn dir_store_round_trips_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn BlobStore> = Arc::new(DirBlobStore::new(dir.path().join("local")));
        let col = analyses(store.clone());
        assert!(col.load_all().is_empty());

        let a = SavedAnalysis::new(AnalysisKind::Intent, "A", "tarot", vec![]);
        col.upsert(a.clone()).unwrap();
        assert!(dir.path().join("local").join("vanguardista-saved-analyses.json").exists());
        assert_eq!(col.find(&a.id), Some(a));

        store.remove(SAVED_ANALYSES_KEY).unwrap();
        assert!(col.load_all().is_empty());
    }

    #[test]
    fn dir_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirBlobStore::new(dir.path());
        assert!(store.set("../escape", "[]").is_err());
        assert!(store.get("a/b").is_none());
    }

    #[test]
    fn tagged_keywords_live_in_their_own_key() {
        use crate::models::keyword::{add_tags, Keyword};

        let store: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::default());
        let tagged: Collection<Keyword> = Collection::new(store.clone(), KEYWORD_TAGS_KEY);
        let mut list = vec![Keyword::new("tarot deck"), Keyword::new("sage")];
        let ids = vec![list[0].id.clone()];
        add_tags(&mut list, &ids, &["cards".into()]);
        tagged.replace_all(&list).unwrap();

        assert_eq!(tagged.load_all(), list);
        assert!(store.get(SAVED_ANALYSES_KEY).is_none());
    }
}
