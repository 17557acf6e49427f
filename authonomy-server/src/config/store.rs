use confique::Config;
use serde::Deserialize;

/// Storage backend holding applications, policies and provider links
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StoreBackend {
    #[default]
    InMemory,
    Redis,
}

/// Configuration for the key-value store
#[derive(Debug, Config, Clone)]
pub struct StoreConfig {
    /// Store backend: "in-memory" (default) or "redis"
    #[config(env = "AUTHONOMY_STORE_BACKEND", default = "in-memory")]
    pub backend: StoreBackend,

    /// Redis connection string, required by the redis backend
    #[config(env = "AUTHONOMY_STORE_REDIS_URL", default = "")]
    pub redis_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::InMemory,
            redis_url: String::new(),
        }
    }
}
