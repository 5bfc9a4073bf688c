//! Selection handoff between the list and detail screens.
//!
//! The list screen writes the chosen id into a single named slot of a
//! [`KeyValueStore`]; the detail screen reads it back when it starts. The slot
//! is overwritten on every selection and is not cleared after it is read.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::fs;

pub const SELECTED_ID_KEY: &str = "selectedPokemonId";

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("store i/o failed: {0}")]
    Io(String),
    #[error("store file is corrupted: {0}")]
    Format(String),
    #[error("store lock poisoned")]
    Poisoned,
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
}

/// Process-local store; its contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }
}

/// Store backed by a JSON object on disk, rewritten on every `set`.
///
/// Writes go to a sibling `.tmp` file that is renamed over the store, so a
/// crash mid-write leaves the previous contents intact.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<HashMap<String, String>, StorageError> {
        let json = match fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(err) => {
                return Err(StorageError::Io(format!(
                    "failed to read {}: {err}",
                    self.path.display()
                )))
            }
        };
        serde_json::from_str(&json).map_err(|err| StorageError::Format(err.to_string()))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // An unreadable store is replaced rather than blocking every later write.
        let mut values = match self.read_all().await {
            Ok(values) => values,
            Err(StorageError::Format(reason)) => {
                tracing::warn!(path = %self.path.display(), %reason, "discarding corrupted store");
                HashMap::new()
            }
            Err(err) => return Err(err),
        };
        values.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| StorageError::Io(format!("failed to create store directory: {err}")))?;
        }
        let json = serde_json::to_string_pretty(&values)
            .map_err(|err| StorageError::Format(err.to_string()))?;
        let temp = self.temp_path();
        fs::write(&temp, json).await.map_err(|err| {
            StorageError::Io(format!("failed to write {}: {err}", temp.display()))
        })?;
        fs::rename(&temp, &self.path).await.map_err(|err| {
            StorageError::Io(format!("failed to replace {}: {err}", self.path.display()))
        })
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all().await?.remove(key))
    }
}

#[derive(Clone)]
pub struct SelectionHandoff {
    store: Arc<dyn KeyValueStore>,
}

impl SelectionHandoff {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub async fn select(&self, id: &str) -> Result<(), StorageError> {
        self.store.set(SELECTED_ID_KEY, id).await?;
        tracing::info!(%id, "selection stored");
        Ok(())
    }

    pub async fn selected(&self) -> Result<Option<String>, StorageError> {
        self.store.get(SELECTED_ID_KEY).await
    }
}
