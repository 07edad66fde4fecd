pub mod blob;
pub mod keyword_file;

pub use blob::{
    BlobStore, Collection, DirBlobStore, MemoryBlobStore, Record, CATEGORIES_KEY,
    KEYWORD_TAGS_KEY, SAVED_ANALYSES_KEY, USERS_KEY,
};
pub use keyword_file::KeywordFile;

/// Any failure to persist. Reads never produce one: missing or corrupt data
/// is treated as empty.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageError(pub String);

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError(format!("I/O error: {}", e))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError(format!("Serialization error: {}", e))
    }
}

impl From<tempfile::PersistError> for StorageError {
    fn from(e: tempfile::PersistError) -> Self {
        StorageError(format!("Failed to replace file: {}", e.error))
    }
}
