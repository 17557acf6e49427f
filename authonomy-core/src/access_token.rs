//! Bearer access tokens bundling an application's two credential tokens

use crate::error::AccessTokenError;
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifetime of an issued bearer token unless configured otherwise
pub const DEFAULT_VALIDITY_HOURS: i64 = 24;

/// The two credential tokens carried by every bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialBundle {
    pub oauth_credential: String,
    pub policy_credential: String,
}

impl CredentialBundle {
    pub fn new(oauth_credential: impl Into<String>, policy_credential: impl Into<String>) -> Self {
        Self {
            oauth_credential: oauth_credential.into(),
            policy_credential: policy_credential.into(),
        }
    }
}

/// Claims of a bearer access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    #[serde(rename = "app_id")]
    pub application_did: String,
    #[serde(rename = "credential_jwts")]
    pub credentials: CredentialBundle,
    /// Expiry, in seconds since the epoch
    pub exp: i64,
}

/// HMAC-SHA256 key pair derived from the configured secret
#[derive(Clone)]
pub struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    /// Derives the key from the raw secret bytes. An empty secret is refused.
    pub fn from_secret(secret: &str) -> Result<Self, AccessTokenError> {
        if secret.is_empty() {
            return Err(AccessTokenError::KeyNotConfigured);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        })
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// Issues and validates bearer access tokens
#[derive(Debug, Clone)]
pub struct AccessTokenManager {
    key: SigningKey,
    validity: TimeDelta,
}

impl AccessTokenManager {
    pub fn new(key: SigningKey) -> Self {
        Self::with_validity(key, TimeDelta::hours(DEFAULT_VALIDITY_HOURS))
    }

    pub fn with_validity(key: SigningKey, validity: TimeDelta) -> Self {
        Self { key, validity }
    }

    pub fn validity(&self) -> TimeDelta {
        self.validity
    }

    /// Issue a bearer token for `application_did` expiring one validity period from now
    pub fn issue(
        &self,
        application_did: &str,
        credentials: CredentialBundle,
    ) -> Result<String, AccessTokenError> {
        self.issue_at(application_did, credentials, Utc::now())
    }

    pub fn issue_at(
        &self,
        application_did: &str,
        credentials: CredentialBundle,
        now: DateTime<Utc>,
    ) -> Result<String, AccessTokenError> {
        let expires_at = now.checked_add_signed(self.validity).ok_or_else(|| {
            AccessTokenError::Signing(format!(
                "validity of {} hours overflows the expiry date",
                self.validity.num_hours()
            ))
        })?;
        let claims = AccessTokenClaims {
            application_did: application_did.to_string(),
            credentials,
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.key.encoding,
        )
        .map_err(|e| AccessTokenError::Signing(e.to_string()))?;

        debug!(
            "Issued access token for application '{}' expiring at {}",
            application_did, claims.exp
        );
        Ok(token)
    }

    /// Verify signature and expiry of a bearer token and return its claims unchanged
    pub fn validate(&self, token: &str) -> Result<AccessTokenClaims, AccessTokenError> {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AccessTokenClaims, AccessTokenError> {
        // The MAC covers the encoded header too, so it is checked before anything is parsed
        let (signature, message) = token
            .rsplit_once('.')
            .filter(|(message, _)| message.contains('.'))
            .ok_or_else(|| AccessTokenError::Malformed("expected three segments".to_string()))?;
        let verified = jsonwebtoken::crypto::verify(
            signature,
            message.as_bytes(),
            &self.key.decoding,
            Algorithm::HS256,
        )
        .map_err(|e| AccessTokenError::Malformed(e.to_string()))?;
        if !verified {
            return Err(AccessTokenError::BadSignature);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against the caller's clock
        validation.validate_exp = false;

        let data = jsonwebtoken::decode::<AccessTokenClaims>(token, &self.key.decoding, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AccessTokenError::BadSignature,
                ErrorKind::ExpiredSignature => AccessTokenError::Expired,
                _ => AccessTokenError::Malformed(e.to_string()),
            })?;

        if now.timestamp() > data.claims.exp {
            debug!(
                "Access token for application '{}' expired at {}",
                data.claims.application_did, data.claims.exp
            );
            return Err(AccessTokenError::Expired);
        }

        Ok(data.claims)
    }
}
