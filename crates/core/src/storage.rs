//! Client-side key/value storage
//!
//! Holds the session token, cached user and display preferences under fixed
//! keys. Two backends: an in-memory map and a JSON file on disk.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

use crate::{Error, Result};

pub const STORAGE_KEY_TOKEN: &str = "token";
pub const STORAGE_KEY_USER: &str = "user";
pub const STORAGE_KEY_THEME: &str = "theme";
pub const STORAGE_KEY_VIEW_MODE: &str = "view_mode";

/// Storage interface for client-side persisted state
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Get the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    async fn remove(&self, key: &str) -> Result<()>;

    /// Remove every key
    async fn clear(&self) -> Result<()>;
}

/// Store that lives only as long as the process
#[derive(Default)]
pub struct MemoryClientStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryClientStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientStore for MemoryClientStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}

/// File-based store using a flat JSON object
pub struct FileClientStore {
    /// Path to the JSON file
    path: PathBuf,
    /// In-memory copy of the file
    cache: RwLock<BTreeMap<String, String>>,
}

impl FileClientStore {
    /// Open the store at `path`
    ///
    /// If the file doesn't exist, it will be created on first write.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cache = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    Error::Storage(format!("Failed to parse {}: {}", path.display(), e))
                })?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn persist(&self) -> Result<()> {
        let cache = self.cache.read().await;
        let content = serde_json::to_string_pretty(&*cache)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl ClientStore for FileClientStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.cache.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.cache
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        self.persist().await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let removed = self.cache.write().await.remove(key).is_some();
        if removed {
            self.persist().await?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.cache.write().await.clear();
        self.persist().await
    }
}
