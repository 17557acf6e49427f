pub(crate) use crate::config::identity::IdentityConfig;
pub(crate) use crate::config::provider::ProviderConfig;
pub(crate) use crate::config::store::{StoreBackend, StoreConfig};
pub(crate) use crate::config::token::TokenConfig;
use confique::Config;
use std::path::{Path, PathBuf};

pub mod identity;
pub mod provider;
pub mod store;
pub mod token;

/// Optional configuration file read from the working directory
pub const CONFIG_FILE: &str = "config.toml";

/// Main configuration structure for the authonomy server
#[derive(Debug, Config, Clone)]
pub struct AuthonomyConfig {
    /// The port the server will listen to (default: 8081)
    #[config(env = "AUTHONOMY_PORT", default = 8081)]
    pub port: u16,

    /// Owner API key, expected in the `x-api-key` header of management calls
    #[config(env = "AUTHONOMY_API_KEY")]
    pub api_key: String,

    /// Secret signing the bearer access tokens; startup fails when empty
    #[config(env = "AUTHONOMY_JWT_ENCRYPTION_KEY", default = "")]
    pub jwt_encryption_key: String,

    /// Wipe the store and seed the demo schemas on startup
    #[config(env = "AUTHONOMY_RESET", default = false)]
    pub reset: bool,

    /// Directory holding the demo schemas used by `reset`
    #[config(env = "AUTHONOMY_SCHEMAS_DIR", default = "ssi/schemas")]
    pub schemas_dir: PathBuf,

    #[config(nested)]
    pub identity: IdentityConfig,

    #[config(nested)]
    pub provider: ProviderConfig,

    #[config(nested)]
    pub store: StoreConfig,

    #[config(nested)]
    pub token: TokenConfig,
}

impl AuthonomyConfig {
    /// Loads the configuration from the environment and `config.toml`
    pub fn new() -> Result<Self, confique::Error> {
        Self::load(Path::new(CONFIG_FILE))
    }

    /// Environment variables take precedence over the file, which may be absent
    pub fn load(file: &Path) -> Result<Self, confique::Error> {
        Self::builder().env().file(file).load()
    }

    #[cfg(test)]
    pub fn for_test_with_mocks(
        identity_mock: &wiremock::MockServer,
        provider_mock: &wiremock::MockServer,
    ) -> Self {
        Self {
            api_key: "test_api_key".to_string(),
            port: 0, // Let the OS choose a port
            jwt_encryption_key: "test_jwt_secret".to_string(),
            reset: false,
            schemas_dir: PathBuf::from("ssi/schemas"),
            identity: IdentityConfig {
                url: identity_mock.uri(),
                timeout: 5,
            },
            provider: ProviderConfig {
                graph_url: provider_mock.uri(),
                timeout: 5,
            },
            store: StoreConfig::default(),
            token: TokenConfig { validity_hours: 24 },
        }
    }
}
