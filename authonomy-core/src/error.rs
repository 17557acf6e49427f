use thiserror::Error;

/// Failures while turning a credential JWT into a [`crate::vc::VerifiableCredential`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Malformed credential token: {0}")]
    MalformedToken(String),

    #[error("Credential token has no `vc` claim")]
    MissingVCClaim,

    #[error("Failed to reconstruct verifiable credential: {0}")]
    EnvelopeUnmarshalFailed(String),
}

/// Failures while issuing or validating bearer access tokens
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessTokenError {
    #[error("Access token signing key is not configured")]
    KeyNotConfigured,

    #[error("Failed to sign access token: {0}")]
    Signing(String),

    #[error("Access token signature is invalid")]
    BadSignature,

    #[error("Access token has expired")]
    Expired,

    #[error("Malformed access token: {0}")]
    Malformed(String),
}

/// Failures raised by an [`crate::authorizer::ApplicationDirectory`] lookup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Application directory error: {0}")]
pub struct DirectoryError(pub String);

/// Failures raised by a [`crate::authorizer::CredentialVerifier`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Credential verification failed: {0}")]
pub struct VerificationError(pub String);
