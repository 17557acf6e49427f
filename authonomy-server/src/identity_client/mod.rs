//! Client for the SSI service that owns DIDs, schemas and credentials

use crate::config::IdentityConfig;
use crate::models::{CredentialRequest, CredentialResponse, PolicySchemaRequest, PolicySchemaResponse};
use http::StatusCode;
use log::{debug, error};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use thiserror::Error;
use url::Url;

/// Errors that can occur while talking to the SSI service
#[derive(Debug, Error)]
pub enum IdentityServiceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to {operation}, status code: {status}")]
    UnexpectedStatus {
        operation: &'static str,
        status: StatusCode,
    },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Deserialize)]
struct DidCreationResponse {
    did: DidDocument,
}

#[derive(Debug, Deserialize)]
struct DidDocument {
    id: String,
}

#[derive(Clone)]
pub struct IdentityClient {
    client: Client,
    config: IdentityConfig,
}

impl IdentityClient {
    pub fn new(client: Client, config: IdentityConfig) -> Result<Self, IdentityServiceError> {
        Url::parse(&config.url).map_err(|e| {
            IdentityServiceError::Config(format!("invalid identity service url '{}': {e}", config.url))
        })?;
        Ok(Self { client, config })
    }

    /// Create an Ed25519 `did:key` and return its identifier
    pub async fn create_did(&self) -> Result<String, IdentityServiceError> {
        let response = self
            .client
            .put(self.config.get_url("/dids/key"))
            .json(&json!({"keyType": "Ed25519"}))
            .send()
            .await?;

        let response = expect_status(response, StatusCode::OK, "create DID", true).await?;
        let created: DidCreationResponse = response
            .json()
            .await
            .map_err(|e| IdentityServiceError::InvalidResponse(format!("DID response: {e}")))?;

        debug!("Created DID {}", created.did.id);
        Ok(created.did.id)
    }

    /// Register a credential schema
    pub async fn create_schema(
        &self,
        schema: &PolicySchemaRequest,
    ) -> Result<PolicySchemaResponse, IdentityServiceError> {
        let response = self
            .client
            .put(self.config.get_url("/schemas"))
            .json(schema)
            .send()
            .await?;

        let response = expect_status(response, StatusCode::CREATED, "create schema", false).await?;
        let created: PolicySchemaResponse = response
            .json()
            .await
            .map_err(|e| IdentityServiceError::InvalidResponse(format!("schema response: {e}")))?;

        debug!("Created schema '{}' with id {}", created.name, created.id);
        Ok(created)
    }

    /// Issue a credential from `issuer` to `subject` carrying `data`, checked against `schema_id`
    pub async fn issue_credential(
        &self,
        issuer: &str,
        subject: &str,
        schema_id: &str,
        data: HashMap<String, Value>,
    ) -> Result<CredentialResponse, IdentityServiceError> {
        let request = CredentialRequest {
            issuer: issuer.to_string(),
            verification_method_id: verification_method_id(issuer),
            subject: subject.to_string(),
            schema_id: schema_id.to_string(),
            data,
        };

        let response = self
            .client
            .put(self.config.get_url("/credentials"))
            .json(&request)
            .send()
            .await?;

        let response = expect_status(response, StatusCode::CREATED, "issue credential", false).await?;
        let credential: CredentialResponse = response
            .json()
            .await
            .map_err(|e| IdentityServiceError::InvalidResponse(format!("credential response: {e}")))?;

        debug!(
            "Issued credential {} from {} to {} with schema {}",
            credential.id, issuer, subject, schema_id
        );
        Ok(credential)
    }

    pub async fn schema_exists(&self, schema_id: &str) -> bool {
        self.exists(&format!("/schemas/{schema_id}")).await
    }

    pub async fn did_exists(&self, did: &str) -> bool {
        self.exists(&format!("/dids/key/{did}")).await
    }

    /// Transport failures count as absent
    async fn exists(&self, path: &str) -> bool {
        match self.client.get(self.config.get_url(path)).send().await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                error!("Failed to query identity service for {}: {}", path, e);
                false
            }
        }
    }
}

async fn expect_status(
    response: reqwest::Response,
    expected: StatusCode,
    operation: &'static str,
    any_success: bool,
) -> Result<reqwest::Response, IdentityServiceError> {
    let status = response.status();
    if status == expected || (any_success && status.is_success()) {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    error!("Identity service refused to {} ({}): {}", operation, status, body);
    Err(IdentityServiceError::UnexpectedStatus { operation, status })
}

/// `<did>#<last segment>` for DIDs with at least three segments, empty otherwise
pub fn verification_method_id(did: &str) -> String {
    let segments: Vec<&str> = did.split(':').collect();
    match segments.last() {
        Some(last) if segments.len() >= 3 => format!("{did}#{last}"),
        _ => String::new(),
    }
}
