//! Reasoning-service key. Read once at startup, re-read on demand when unset,
//! and overwritten only by the settings-save handler.

pub mod handlers;

use std::sync::{Arc, RwLock};

use tracing::info;

use crate::storage::{keys, LocalStore, StorageError};

pub struct CredentialStore {
    store: Arc<dyn LocalStore>,
    cached: RwLock<Option<String>>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self {
            store,
            cached: RwLock::new(None),
        }
    }

    /// Reads the persisted key into the cache.
    pub async fn load(&self) -> Result<Option<String>, StorageError> {
        let key = self
            .store
            .get(keys::REASONING_API_KEY)
            .await?
            .and_then(non_blank);
        self.replace_cached(key.clone());
        info!("Reasoning API key {}", if key.is_some() { "loaded" } else { "not set" });
        Ok(key)
    }

    /// Cached key, falling back to durable storage when nothing is cached yet.
    pub async fn get(&self) -> Result<Option<String>, StorageError> {
        if let Some(key) = self.cached() {
            return Ok(Some(key));
        }
        self.load().await
    }

    pub async fn set(&self, key: &str) -> Result<(), StorageError> {
        match non_blank(key.to_string()) {
            Some(key) => {
                self.store.set(keys::REASONING_API_KEY, key.clone()).await?;
                self.replace_cached(Some(key));
            }
            None => {
                self.store.remove_many(&[keys::REASONING_API_KEY]).await?;
                self.replace_cached(None);
            }
        }
        info!("Reasoning API key updated");
        Ok(())
    }

    pub fn is_set(&self) -> bool {
        self.cached().is_some()
    }

    fn cached(&self) -> Option<String> {
        self.cached
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn replace_cached(&self, key: Option<String>) {
        *self
            .cached
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = key;
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
