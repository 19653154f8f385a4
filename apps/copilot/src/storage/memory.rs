use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{LocalStore, StorageError};

/// Process-local store. Used in tests and with `STORAGE_URL=memory`.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn get_many(&self, keys: &[&str]) -> Result<HashMap<String, String>, StorageError> {
        let entries = self.entries();
        Ok(keys
            .iter()
            .filter_map(|key| entries.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    async fn set_many(&self, new_entries: &[(&str, String)]) -> Result<(), StorageError> {
        let mut entries = self.entries();
        for (key, value) in new_entries {
            entries.insert(key.to_string(), value.clone());
        }
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut entries = self.entries();
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_get_set_remove() {
        let store = MemoryStore::new();
        store.set("a", "1".to_string()).await.unwrap();
        store
            .set_many(&[("b", "2".to_string()), ("c", "3".to_string())])
            .await
            .unwrap();

        let found = store.get_many(&["a", "b", "missing"]).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found["b"], "2");

        store.remove_many(&["a", "b"]).await.unwrap();
        assert!(store.get("a").await.unwrap().is_none());
        assert_eq!(store.get("c").await.unwrap().as_deref(), Some("3"));
    }
}
