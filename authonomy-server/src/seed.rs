//! Demo data written to a freshly reset store

use crate::identity_client::{IdentityClient, IdentityServiceError};
use crate::models::{PolicySchemaRequest, PolicySchemaResponse, ProviderSchema, FACEBOOK};
use crate::store::{StorageBackend, Store, StoreError};
use log::info;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Policy schemas registered and listed under `/policies`
const POLICY_SCHEMA_FILES: [&str; 2] = ["rbac.json", "abac.json"];
/// Schema of the OAuth credentials issued for facebook users
const OAUTH_SCHEMA_FILE: &str = "oauth_info.json";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read schema file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid schema file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Identity(#[from] IdentityServiceError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

async fn register_schema(
    identity: &IdentityClient,
    path: PathBuf,
) -> Result<PolicySchemaResponse, SeedError> {
    let contents = tokio::fs::read(&path).await.map_err(|source| SeedError::Read {
        path: path.clone(),
        source,
    })?;
    let request: PolicySchemaRequest =
        serde_json::from_slice(&contents).map_err(|source| SeedError::Parse {
            path: path.clone(),
            source,
        })?;

    let schema = identity.create_schema(&request).await?;
    info!("Registered demo schema '{}' as {}", schema.name, schema.id);
    Ok(schema)
}

/// Wipe the store and register the demo schemas found in `schemas_dir`
pub async fn reset_and_seed(
    store: &Store,
    identity: &IdentityClient,
    schemas_dir: &Path,
) -> Result<(), SeedError> {
    store.clear().await?;
    info!("Store cleared");

    for file in POLICY_SCHEMA_FILES {
        let policy = register_schema(identity, schemas_dir.join(file)).await?;
        store.set_policy(&policy).await?;
    }

    let oauth = register_schema(identity, schemas_dir.join(OAUTH_SCHEMA_FILE)).await?;
    store
        .set_provider_schema(&ProviderSchema {
            provider_name: FACEBOOK.to_string(),
            schema_id: oauth.id,
        })
        .await?;
    Ok(())
}
