//! # authonomy-core
//!
//! Credential-to-token pipeline of the authonomy authorization layer.
//!
//! ## Components
//!
//! - **VC-JWT decoder** ([`vc`]): rebuilds a Verifiable Credential from a
//!   compact token issued by the identity service, without checking its signature.
//! - **Access tokens** ([`access_token`]): HS256 bearer tokens bundling an
//!   application DID with its OAuth and policy credential tokens.
//! - **Roles** ([`rbac`]): role membership checks against a policy credential subject.
//! - **Authorizer** ([`authorizer`]): validates a bearer token, confirms both
//!   credentials were issued by the claiming application and evaluates a role.

pub mod access_token;
pub mod authorizer;
pub mod error;
pub mod rbac;
pub mod vc;

pub use access_token::{AccessTokenClaims, AccessTokenManager, CredentialBundle, SigningKey};
pub use authorizer::{
    ApplicationDirectory, ApplicationRecord, AuthorizationError, AuthorizationOutcome, Authorizer,
    CredentialVerifier, TrustIdentityService,
};
pub use error::{AccessTokenError, DecodeError, DirectoryError, VerificationError};
pub use vc::{DecodedCredential, VerifiableCredential};
