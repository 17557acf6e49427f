use crate::config::{StoreBackend, StoreConfig};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub mod memory;
pub mod records;
pub mod redis;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to serialize value: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Failed to parse value: {0}")]
    Deserialization(String),
    #[error("Redis error: {0}")]
    Redis(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Contract shared by all key-value backends.
///
/// Values are stored as JSON strings and never expire.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store a value under `key`, replacing any previous value
    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T)
        -> Result<(), StoreError>;

    /// Retrieve the value stored under `key`
    async fn get<T: DeserializeOwned + Send + Sync>(
        &self,
        key: &str,
    ) -> Result<Option<T>, StoreError>;

    /// All values whose key starts with `prefix`, ordered by key
    async fn list<T: DeserializeOwned + Send + Sync>(
        &self,
        prefix: &str,
    ) -> Result<Vec<T>, StoreError>;

    /// Delete the value stored under `key`
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Remove every entry
    async fn clear(&self) -> Result<(), StoreError>;

    /// Returns Ok(()) if the backend is reachable
    async fn health_check(&self) -> Result<(), String>;
}

/// Store implementation chosen at startup from the configuration
#[derive(Clone)]
pub enum Store {
    /// In-memory store using Moka
    InMemory(memory::InMemoryStore),
    /// Redis-based store
    Redis(redis::RedisStore),
}

#[async_trait::async_trait]
impl StorageBackend for Store {
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        match self {
            Self::InMemory(store) => store.set(key, value).await,
            Self::Redis(store) => store.set(key, value).await,
        }
    }

    async fn get<T: DeserializeOwned + Send + Sync>(
        &self,
        key: &str,
    ) -> Result<Option<T>, StoreError> {
        match self {
            Self::InMemory(store) => store.get(key).await,
            Self::Redis(store) => store.get(key).await,
        }
    }

    async fn list<T: DeserializeOwned + Send + Sync>(
        &self,
        prefix: &str,
    ) -> Result<Vec<T>, StoreError> {
        match self {
            Self::InMemory(store) => store.list(prefix).await,
            Self::Redis(store) => store.list(prefix).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        match self {
            Self::InMemory(store) => store.delete(key).await,
            Self::Redis(store) => store.delete(key).await,
        }
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match self {
            Self::InMemory(store) => store.clear().await,
            Self::Redis(store) => store.clear().await,
        }
    }

    async fn health_check(&self) -> Result<(), String> {
        match self {
            Self::InMemory(store) => store.health_check().await,
            Self::Redis(store) => store.health_check().await,
        }
    }
}

/// Creates the store selected by `config`
pub async fn create_store(config: &StoreConfig) -> Result<Store, StoreError> {
    match config.backend {
        StoreBackend::InMemory => Ok(Store::InMemory(memory::InMemoryStore::new())),
        StoreBackend::Redis => {
            if config.redis_url.is_empty() {
                return Err(StoreError::Config(
                    "Redis URL is required for the redis store".to_string(),
                ));
            }
            let store = redis::RedisStore::new(&config.redis_url)
                .await
                .map_err(StoreError::Config)?;
            Ok(Store::Redis(store))
        }
    }
}
