//! Local durable key-value storage
//!
//! The persisted session slot lives here. Implementations are deliberately
//! small: one file per key on disk, or an in-memory map for tests and
//! ephemeral use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use thiserror::Error;
use tokio::fs;

/// Well-known key for the persisted session blob.
///
/// A single session slot per device; there is no multi-account support.
pub const SESSION_STORAGE_KEY: &str = "supabase_session";

/// エラー型
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// Durable key-value storage consumed by the signup flow
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Store `value` under `key`, overwriting any previous value
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Read the value stored under `key`
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
}

/// File-backed storage: one file per key inside a directory
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a new file-backed storage rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        // Keys become file names; separators would escape the directory
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).await?;
        fs::write(&path, value.as_bytes()).await?;
        Ok(())
    }

    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory storage
#[derive(Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty in-memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.write().unwrap();
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.read().unwrap();
        Ok(items.get(key).cloned())
    }
}
