use super::{KvStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryKvStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let store = InMemoryKvStore::new();

        assert_eq!(store.get("tasks_c1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn can_overwrite_value() {
        let store = InMemoryKvStore::new();

        store.set("tasks_c1", b"first".to_vec()).await.unwrap();
        store.set("tasks_c1", b"second".to_vec()).await.unwrap();

        assert_eq!(
            store.get("tasks_c1").await.unwrap(),
            Some(b"second".to_vec())
        );
    }
}
