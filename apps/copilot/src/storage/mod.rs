//! Durable local key/value storage: the reasoning-service key and the session
//! pair live here across restarts.

pub mod memory;
pub mod sqlite;

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub mod keys {
    pub const REASONING_API_KEY: &str = "reasoning_api_key";
    pub const AUTH_TOKEN: &str = "auth_token";
    pub const AUTH_USER: &str = "auth_user";
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Local storage error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Keyed string storage. `set_many` and `remove_many` apply all entries or none.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get_many(&self, keys: &[&str]) -> Result<HashMap<String, String>, StorageError>;

    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError>;

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError>;

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get_many(&[key]).await?.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.set_many(&[(key, value)]).await
    }
}
