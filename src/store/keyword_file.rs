use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::StorageError;
use crate::models::keyword::Keyword;

/// Server-side keyword list: one JSON array in one file.
///
/// Saves are read-modify-write without locking; two concurrent saves race and
/// the last writer wins.
#[derive(Debug, Clone)]
pub struct KeywordFile {
    path: PathBuf,
}

impl KeywordFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Everything stored. A missing or unreadable file is an empty list.
    pub fn load_all(&self) -> Vec<Keyword> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => return vec![],
            Err(e) => {
                log::warn!("Could not read {}: {}", self.path.display(), e);
                return vec![];
            }
        };
        if text.trim().is_empty() {
            return vec![];
        }
        match serde_json::from_str(&text) {
            Ok(list) => list,
            Err(e) => {
                log::warn!(
                    "Ignoring malformed keyword file {}: {}",
                    self.path.display(),
                    e
                );
                vec![]
            }
        }
    }

    /// Merge `incoming` into the stored list. An entry whose lower-cased
    /// keyword text matches a stored one replaces it in place; anything else
    /// is appended. Returns the stored list after the write.
    pub fn save(&self, incoming: Vec<Keyword>) -> Result<Vec<Keyword>, StorageError> {
        for kw in &incoming {
            kw.validate().map_err(StorageError)?;
        }

        let mut stored = self.load_all();
        for mut kw in incoming {
            kw.keyword = kw.keyword.trim().to_string();
            if kw.id.trim().is_empty() {
                kw.id = uuid::Uuid::new_v4().to_string();
            }
            let key = kw.merge_key();
            let slot = stored.iter().position(|s| s.merge_key() == key);
            // ids stay unique: an id already held by a different keyword is reissued
            let taken = stored
                .iter()
                .enumerate()
                .any(|(i, s)| s.id == kw.id && Some(i) != slot);
            if taken {
                let fresh = uuid::Uuid::new_v4().to_string();
                log::warn!(
                    "Keyword id '{}' already belongs to another entry; '{}' saved as {}",
                    kw.id,
                    kw.keyword,
                    fresh
                );
                kw.id = fresh;
            }
            match slot {
                Some(i) => stored[i] = kw,
                None => stored.push(kw),
            }
        }

        self.write(&stored)?;
        log::info!("Saved keyword store ({} entries)", stored.len());
        Ok(stored)
    }

    /// Overwrite the stored list after in-place edits such as tagging or
    /// category assignment.
    pub fn replace_all(&self, list: &[Keyword]) -> Result<(), StorageError> {
        for kw in list {
            kw.validate().map_err(StorageError)?;
        }
        self.write(list)
    }

    /// Returns whether anything was removed.
    pub fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let mut stored = self.load_all();
        let before = stored.len();
        stored.retain(|k| k.id != id);
        if stored.len() == before {
            return Ok(false);
        }
        self.write(&stored)?;
        Ok(true)
    }

    fn write(&self, list: &[Keyword]) -> Result<(), StorageError> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let mut tmp = NamedTempFile::new_in(parent)?;
        serde_json::to_writer_pretty(&mut tmp, list)?;
        tmp.write_all(b"\n")?;
        tmp.persist(&self.path)?;
        Ok(())
    }
}
