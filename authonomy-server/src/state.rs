use crate::config::AuthonomyConfig;
use crate::identity_client::{IdentityClient, IdentityServiceError};
use crate::provider_client::ProviderClient;
use crate::store::{create_store, Store, StoreError};
use authonomy_core::{AccessTokenError, AccessTokenManager, Authorizer, SigningKey};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Failures while assembling the application state; all of them are fatal at startup
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Invalid JWT encryption key: {0}")]
    SigningKey(#[from] AccessTokenError),
    #[error("Failed to create store: {0}")]
    Store(#[from] StoreError),
    #[error("Failed to create HTTP client: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Identity(#[from] IdentityServiceError),
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AuthonomyConfig>,
    pub store: Arc<Store>,
    pub identity: Arc<IdentityClient>,
    pub provider: Arc<ProviderClient>,
    pub authorizer: Arc<Authorizer>,
}

impl AppState {
    fn create_http_client(timeout: u64) -> Result<Client, reqwest::Error> {
        Client::builder()
            .timeout(Duration::from_secs(timeout))
            .connect_timeout(Duration::from_secs(2))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
    }

    /// Builds the state, connecting to the configured store backend
    pub async fn new(config: AuthonomyConfig) -> Result<Self, StateError> {
        // A missing signing secret must abort before anything is connected
        let key = SigningKey::from_secret(&config.jwt_encryption_key)?;
        let store = create_store(&config.store).await?;
        Self::assemble(config, store, key)
    }

    /// Builds the state around an existing store
    pub fn with_store(config: AuthonomyConfig, store: Store) -> Result<Self, StateError> {
        let key = SigningKey::from_secret(&config.jwt_encryption_key)?;
        Self::assemble(config, store, key)
    }

    fn assemble(config: AuthonomyConfig, store: Store, key: SigningKey) -> Result<Self, StateError> {
        let identity = IdentityClient::new(
            Self::create_http_client(config.identity.timeout)?,
            config.identity.clone(),
        )?;
        let provider = ProviderClient::new(
            Self::create_http_client(config.provider.timeout)?,
            &config.provider,
        );
        let tokens = AccessTokenManager::with_validity(key, config.token.validity());
        let authorizer = Authorizer::new(tokens, Arc::new(store.clone()));

        Ok(Self {
            config: Arc::new(config),
            store: Arc::new(store),
            identity: Arc::new(identity),
            provider: Arc::new(provider),
            authorizer: Arc::new(authorizer),
        })
    }
}
