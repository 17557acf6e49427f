//! Authorization of bearer-authenticated requests
//!
//! The [`Authorizer`] ties the pieces of the crate together: it exchanges a
//! pair of credential tokens for a bearer token, and later recovers those
//! credentials from the bearer token, checks they still belong to the
//! application and evaluates the requested role against the policy credential.

use crate::access_token::{AccessTokenClaims, AccessTokenManager, CredentialBundle};
use crate::error::{AccessTokenError, DecodeError, DirectoryError, VerificationError};
use crate::rbac;
use crate::vc::{self, DecodedCredential};
use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Application as known to the directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub did: String,
    pub name: String,
    #[serde(default)]
    pub details: Map<String, Value>,
}

/// Lookup of registered applications by DID
#[async_trait]
pub trait ApplicationDirectory: Send + Sync {
    async fn get_application(&self, did: &str) -> Result<Option<ApplicationRecord>, DirectoryError>;
}

/// Signature verification of credential tokens
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, token: &str, decoded: &DecodedCredential) -> Result<(), VerificationError>;
}

/// Accepts every credential: tokens are trusted as issued by the identity service.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustIdentityService;

#[async_trait]
impl CredentialVerifier for TrustIdentityService {
    async fn verify(&self, _token: &str, _decoded: &DecodedCredential) -> Result<(), VerificationError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    OAuth,
    Policy,
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OAuth => f.write_str("oauth"),
            Self::Policy => f.write_str("policy"),
        }
    }
}

/// How an authorization attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    Allowed,
    Unauthenticated,
    Forbidden,
    NotFound,
    IntegrityError,
    /// A collaborator failed before a decision could be made
    Unavailable,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("Missing or malformed bearer token")]
    MissingBearer,

    #[error("Invalid access token: {0}")]
    InvalidToken(#[source] AccessTokenError),

    #[error("Application '{0}' not found")]
    ApplicationNotFound(String),

    #[error("Failed to decode {kind} credential: {source}")]
    UndecodableCredential {
        kind: CredentialKind,
        source: DecodeError,
    },

    #[error("The {kind} credential was not issued by application '{expected}'")]
    IssuerMismatch {
        kind: CredentialKind,
        expected: String,
        found: Option<String>,
    },

    #[error("The {kind} credential was rejected: {source}")]
    Unverified {
        kind: CredentialKind,
        source: VerificationError,
    },

    #[error("Role '{0}' is not granted")]
    RoleNotFound(String),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("Failed to issue access token: {0}")]
    Issue(#[source] AccessTokenError),
}

impl AuthorizationError {
    pub fn outcome(&self) -> AuthorizationOutcome {
        match self {
            Self::MissingBearer | Self::InvalidToken(_) => AuthorizationOutcome::Unauthenticated,
            Self::ApplicationNotFound(_) => AuthorizationOutcome::NotFound,
            Self::UndecodableCredential { .. } | Self::IssuerMismatch { .. } | Self::Unverified { .. } => {
                AuthorizationOutcome::IntegrityError
            }
            Self::RoleNotFound(_) => AuthorizationOutcome::Forbidden,
            Self::Directory(_) | Self::Issue(_) => AuthorizationOutcome::Unavailable,
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value
pub fn parse_bearer(header: Option<&str>) -> Result<&str, AuthorizationError> {
    let header = header.ok_or(AuthorizationError::MissingBearer)?;
    let parts: Vec<&str> = header.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] if !token.is_empty() => Ok(*token),
        _ => Err(AuthorizationError::MissingBearer),
    }
}

#[derive(Clone)]
pub struct Authorizer {
    tokens: AccessTokenManager,
    directory: Arc<dyn ApplicationDirectory>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl Authorizer {
    pub fn new(tokens: AccessTokenManager, directory: Arc<dyn ApplicationDirectory>) -> Self {
        Self::with_verifier(tokens, directory, Arc::new(TrustIdentityService))
    }

    pub fn with_verifier(
        tokens: AccessTokenManager,
        directory: Arc<dyn ApplicationDirectory>,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Self {
        Self {
            tokens,
            directory,
            verifier,
        }
    }

    pub fn tokens(&self) -> &AccessTokenManager {
        &self.tokens
    }

    /// Exchange an application's two credential tokens for a bearer token.
    ///
    /// Both credentials must decode and must have been issued by `application_did`.
    pub async fn exchange(
        &self,
        application_did: &str,
        credentials: CredentialBundle,
    ) -> Result<String, AuthorizationError> {
        self.check_credential(CredentialKind::OAuth, &credentials.oauth_credential, application_did)
            .await?;
        self.check_credential(CredentialKind::Policy, &credentials.policy_credential, application_did)
            .await?;

        self.tokens
            .issue(application_did, credentials)
            .map_err(AuthorizationError::Issue)
    }

    /// Decide whether the bearer of `authorization` holds `role`.
    pub async fn authorize(
        &self,
        authorization: Option<&str>,
        role: &str,
    ) -> Result<AccessTokenClaims, AuthorizationError> {
        let result = self.evaluate(authorization, role).await;
        match &result {
            Ok(claims) => debug!(
                "Granted role '{}' to bearer of application '{}'",
                role, claims.application_did
            ),
            Err(e) => warn!("Denied role '{}': {}", role, e),
        }
        result
    }

    async fn evaluate(
        &self,
        authorization: Option<&str>,
        role: &str,
    ) -> Result<AccessTokenClaims, AuthorizationError> {
        let token = parse_bearer(authorization)?;
        let claims = self
            .tokens
            .validate(token)
            .map_err(AuthorizationError::InvalidToken)?;

        let app_did = claims.application_did.as_str();
        if self.directory.get_application(app_did).await?.is_none() {
            return Err(AuthorizationError::ApplicationNotFound(app_did.to_string()));
        }

        self.check_credential(CredentialKind::OAuth, &claims.credentials.oauth_credential, app_did)
            .await?;
        let policy = self
            .check_credential(CredentialKind::Policy, &claims.credentials.policy_credential, app_did)
            .await?;

        if !rbac::has_role(&policy.credential.credential_subject, role) {
            return Err(AuthorizationError::RoleNotFound(role.to_string()));
        }

        Ok(claims)
    }

    async fn check_credential(
        &self,
        kind: CredentialKind,
        token: &str,
        application_did: &str,
    ) -> Result<DecodedCredential, AuthorizationError> {
        let decoded =
            vc::decode(token).map_err(|source| AuthorizationError::UndecodableCredential { kind, source })?;

        self.verifier
            .verify(token, &decoded)
            .await
            .map_err(|source| AuthorizationError::Unverified { kind, source })?;

        let issuer = decoded.credential.issuer_did();
        if issuer != Some(application_did) {
            return Err(AuthorizationError::IssuerMismatch {
                kind,
                expected: application_did.to_string(),
                found: issuer.map(str::to_string),
            });
        }

        Ok(decoded)
    }
}
