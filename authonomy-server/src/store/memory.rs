use super::{StorageBackend, StoreError};
use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use serde::{de::DeserializeOwned, Serialize};

/// Unbounded in-memory store; entries live until deleted or cleared
#[derive(Clone)]
pub struct InMemoryStore {
    entries: MokaCache<String, String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: MokaCache::builder().build(),
        }
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.to_string())
            .collect();
        keys.sort();
        keys
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn parse<T: DeserializeOwned>(value: &str) -> Result<T, StoreError> {
    serde_json::from_str(value).map_err(|e| StoreError::Deserialization(e.to_string()))
}

#[async_trait]
impl StorageBackend for InMemoryStore {
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let serialized = serde_json::to_string(value)?;
        self.entries.insert(key.to_string(), serialized).await;
        Ok(())
    }

    async fn get<T: DeserializeOwned + Send + Sync>(
        &self,
        key: &str,
    ) -> Result<Option<T>, StoreError> {
        match self.entries.get(key).await {
            Some(value) => parse(&value).map(Some),
            None => Ok(None),
        }
    }

    async fn list<T: DeserializeOwned + Send + Sync>(
        &self,
        prefix: &str,
    ) -> Result<Vec<T>, StoreError> {
        let mut values = Vec::new();
        for key in self.keys_with_prefix(prefix) {
            // Entries removed since the scan are skipped
            if let Some(value) = self.entries.get(&key).await {
                values.push(parse(&value)?);
            }
        }
        Ok(values)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key).await;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        for key in self.keys_with_prefix("") {
            self.entries.invalidate(&key).await;
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), String> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestData {
        field: String,
    }

    #[tokio::test]
    async fn test_store_operations() {
        let store = InMemoryStore::new();

        let data = TestData {
            field: "test".to_string(),
        };

        store.set("test_key", &data).await.unwrap();
        let retrieved: TestData = store.get("test_key").await.unwrap().unwrap();
        assert_eq!(data, retrieved);

        // Entries do not expire on their own
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(store.get::<TestData>("test_key").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_filters_by_prefix() {
        let store = InMemoryStore::new();
        store.set("app-b", &"b").await.unwrap();
        store.set("app-a", &"a").await.unwrap();
        store.set("policy-a", &"p").await.unwrap();

        let apps: Vec<String> = store.list("app-").await.unwrap();
        assert_eq!(apps, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_corrupt_value_is_reported() {
        let store = InMemoryStore::new();
        store
            .entries
            .insert("broken".to_string(), "{not json".to_string())
            .await;

        assert!(matches!(
            store.get::<TestData>("broken").await,
            Err(StoreError::Deserialization(_))
        ));
    }

    #[tokio::test]
    async fn test_clear() {
        let store = InMemoryStore::new();
        store.set("one", &1).await.unwrap();
        store.set("two", &2).await.unwrap();

        store.clear().await.unwrap();
        assert!(store.get::<i32>("one").await.unwrap().is_none());
        assert!(store.list::<i32>("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_health_check() {
        let store = InMemoryStore::new();
        let result = store.health_check().await;
        assert!(result.is_ok(), "health check failed: {:?}", result);
    }
}
