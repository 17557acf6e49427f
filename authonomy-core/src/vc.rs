//! VC-JWT decoding
//!
//! Credential tokens are issued and signed by the external identity service.
//! Decoding here only reconstructs the credential: the reserved `vc` claim is
//! read as the credential envelope and the registered JWT claims are laid on
//! top of it. Signatures are not checked (see [`crate::authorizer::CredentialVerifier`]).

use crate::error::DecodeError;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

/// Reserved claim holding the credential envelope
pub const VC_CLAIM: &str = "vc";

/// Credential subject entry populated from the `sub` claim
pub const SUBJECT_ID: &str = "id";

/// Protocol header of a compact JWS
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JoseHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cty: Option<String>,
    /// Any other header parameters, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Registered JWT claims (RFC 7519 section 4.1)
///
/// Claims of an unexpected JSON type are treated as absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegisteredClaims {
    pub issuer: Option<String>,
    pub subject: Option<String>,
    pub audience: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub not_before: Option<DateTime<Utc>>,
    pub issued_at: Option<DateTime<Utc>>,
    pub jwt_id: Option<String>,
}

impl RegisteredClaims {
    fn from_payload(payload: &Map<String, Value>) -> Self {
        let string_claim = |name: &str| payload.get(name).and_then(Value::as_str).map(str::to_string);
        let date_claim = |name: &str| payload.get(name).and_then(numeric_date);

        let audience = match payload.get("aud") {
            Some(Value::String(aud)) => vec![aud.clone()],
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };

        Self {
            issuer: string_claim("iss"),
            subject: string_claim("sub"),
            audience,
            expires_at: date_claim("exp"),
            not_before: date_claim("nbf"),
            issued_at: date_claim("iat"),
            jwt_id: string_claim("jti"),
        }
    }
}

/// Interprets a JSON value as a NumericDate (seconds since the epoch)
fn numeric_date(value: &Value) -> Option<DateTime<Utc>> {
    let seconds = value
        .as_i64()
        .or_else(|| value.as_f64().map(|secs| secs.trunc() as i64))?;
    DateTime::from_timestamp(seconds, 0)
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Issuer of a credential: a DID string or an issuer object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Issuer {
    Did(String),
    Object(Map<String, Value>),
}

impl Issuer {
    /// The issuer DID, when the issuer is expressed as a plain string
    pub fn as_did(&self) -> Option<&str> {
        match self {
            Self::Did(did) => Some(did),
            Self::Object(_) => None,
        }
    }
}

/// Claims about the credential subject, keyed by claim name
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialSubject(Map<String, Value>);

impl CredentialSubject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subject identifier, usually the holder DID
    pub fn id(&self) -> Option<&str> {
        self.0.get(SUBJECT_ID).and_then(Value::as_str)
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.0.insert(SUBJECT_ID.to_string(), Value::String(id.into()));
    }

    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.0.get(claim)
    }

    pub fn insert(&mut self, claim: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(claim.into(), value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn claims(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for CredentialSubject {
    fn from(claims: Map<String, Value>) -> Self {
        Self(claims)
    }
}

/// A W3C Verifiable Credential (data model 1.1)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential {
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub credential_type: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Issuer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuance_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_status: Option<Value>,
    #[serde(default, skip_serializing_if = "CredentialSubject::is_empty")]
    pub credential_subject: CredentialSubject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_service: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_of_use: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Value>,
}

impl VerifiableCredential {
    /// The issuer DID, if the issuer is a plain DID string
    pub fn issuer_did(&self) -> Option<&str> {
        self.issuer.as_ref().and_then(Issuer::as_did)
    }

    /// Lays the registered claims over the envelope.
    ///
    /// Precedence is fixed: `jti`, `iat`, `exp`, `iss` and `sub` each replace
    /// the envelope value only when present with a usable type and value.
    fn apply_registered_claims(&mut self, claims: &RegisteredClaims) {
        if let Some(jti) = non_empty(&claims.jwt_id) {
            self.id = Some(jti.to_string());
        }
        if let Some(iat) = claims.issued_at {
            self.issuance_date = Some(rfc3339(iat));
        }
        if let Some(exp) = claims.expires_at {
            self.expiration_date = Some(rfc3339(exp));
        }
        if let Some(iss) = non_empty(&claims.issuer) {
            self.issuer = Some(Issuer::Did(iss.to_string()));
        }
        if let Some(sub) = non_empty(&claims.subject) {
            self.credential_subject.set_id(sub);
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Everything recovered from one credential token
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCredential {
    pub header: JoseHeader,
    pub claims: RegisteredClaims,
    pub credential: VerifiableCredential,
}

/// Decodes a VC-JWT without verifying its signature.
pub fn decode(token: &str) -> Result<DecodedCredential, DecodeError> {
    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(DecodeError::MalformedToken(
            "expected three dot-separated segments".to_string(),
        ));
    };

    let header: JoseHeader = decode_segment(header, "header")?;
    let payload: Map<String, Value> = decode_segment(payload, "payload")?;
    let claims = RegisteredClaims::from_payload(&payload);

    let envelope = match payload.get(VC_CLAIM) {
        None | Some(Value::Null) => return Err(DecodeError::MissingVCClaim),
        Some(envelope) => envelope.clone(),
    };
    let mut credential: VerifiableCredential = serde_json::from_value(envelope)
        .map_err(|e| DecodeError::EnvelopeUnmarshalFailed(e.to_string()))?;
    credential.apply_registered_claims(&claims);

    debug!(
        "Decoded credential '{}' issued by '{}'",
        credential.id.as_deref().unwrap_or("<none>"),
        credential.issuer_did().unwrap_or("<unknown>")
    );

    Ok(DecodedCredential {
        header,
        claims,
        credential,
    })
}

fn decode_segment<T: DeserializeOwned>(segment: &str, part: &str) -> Result<T, DecodeError> {
    if segment.is_empty() {
        return Err(DecodeError::MalformedToken(format!("empty {part} segment")));
    }
    let bytes = URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|e| DecodeError::MalformedToken(format!("{part} is not base64url: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| DecodeError::MalformedToken(format!("{part} is not a JSON object: {e}")))
}
