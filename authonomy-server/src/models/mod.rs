use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use utoipa::ToSchema;

/// Registration request for a relying application
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ApplicationRequest {
    /// Display name, 3 to 100 characters
    pub app_name: String,
    pub app_details: AppDetails,
}

impl ApplicationRequest {
    pub fn validate(&self) -> Result<(), String> {
        let name_len = self.app_name.chars().count();
        if !(3..=100).contains(&name_len) {
            return Err("app_name must be between 3 and 100 characters".to_string());
        }
        let description_len = self.app_details.description.chars().count();
        if !(10..=500).contains(&description_len) {
            return Err("app_details.description must be between 10 and 500 characters".to_string());
        }
        match self.app_details.email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err("app_details.email must be a valid email address".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AppDetails {
    /// Free-text description, 10 to 500 characters
    pub description: String,
    /// Contact email of the application owner
    pub email: String,
}

/// A registered application; stored under its DID
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ApplicationResponse {
    pub app_did: String,
    pub app_name: String,
    pub app_details: AppDetails,
}

/// JSON schema describing the data of a credential
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct JsonSchema {
    #[serde(rename = "$schema")]
    pub dollar_schema: String,
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: HashMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PolicySchemaRequest {
    pub name: String,
    pub schema: JsonSchema,
}

/// A schema registered at the identity service
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PolicySchemaResponse {
    pub id: String,
    pub name: String,
    pub schema: JsonSchema,
}

/// Issue an application policy credential
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ApplicationPolicyRequest {
    pub application_did: String,
    pub schema_id: String,
    pub issuer_did: String,
    /// Credential data, validated by the identity service against the schema
    pub credential: HashMap<String, Value>,
}

/// Policy credential issued to an application; stored under the application DID
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ApplicationPolicyResponse {
    pub application_did: String,
    pub schema_id: String,
    pub issuer_did: String,
    pub credential_id: String,
}

/// Credential issuance request sent to the identity service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRequest {
    pub issuer: String,
    pub verification_method_id: String,
    pub subject: String,
    pub schema_id: String,
    pub data: HashMap<String, Value>,
}

/// Credential issued by the identity service
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialResponse {
    pub id: String,
    pub fully_qualified_verification_method_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<Value>,
    pub credential_jwt: String,
}

/// Connector offered for end-user authentication
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AvailableProvider {
    pub provider_name: String,
    /// social, email, phone, ...
    pub provider_type: String,
    pub provider_protocol: String,
}

impl AvailableProvider {
    pub fn facebook() -> Self {
        Self {
            provider_name: FACEBOOK.to_string(),
            provider_type: "social".to_string(),
            provider_protocol: "oauth2".to_string(),
        }
    }
}

pub const FACEBOOK: &str = "facebook";

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct OAuthConfig {
    pub client_id: String,
    #[serde(default)]
    pub redirect_url: String,
}

/// Authentication provider linked to an application; stored under the application DID
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AuthProvider {
    pub app_did: String,
    #[serde(rename = "app_details")]
    pub provider: AvailableProvider,
    pub config: OAuthConfig,
}

/// Schema used for the OAuth credentials of a provider
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ProviderSchema {
    pub provider_name: String,
    pub schema_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct IssueOAuthCredentialRequest {
    pub app_did: String,
    pub provider: String,
    /// Access token obtained by the user from the provider
    pub access_token: String,
    pub user_did: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct IssueOAuthCredentialResponse {
    pub oauth_credential: CredentialResponse,
    pub policy_credential: CredentialResponse,
}

/// Data of an OAuth credential
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub user_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GetAccessTokenRequest {
    pub app_did: String,
    /// OAuth credential JWT
    pub oauth_credential: String,
    /// Policy credential JWT
    pub policy_credential: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GetAccessTokenResponse {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(name: &str, description: &str, email: &str) -> ApplicationRequest {
        ApplicationRequest {
            app_name: name.to_string(),
            app_details: AppDetails {
                description: description.to_string(),
                email: email.to_string(),
            },
        }
    }

    #[test]
    fn test_application_request_validation() {
        assert!(request("demo", "a demo application", "owner@example.com")
            .validate()
            .is_ok());
        assert!(request("ab", "a demo application", "owner@example.com")
            .validate()
            .is_err());
        assert!(request(&"x".repeat(101), "a demo application", "owner@example.com")
            .validate()
            .is_err());
        assert!(request("demo", "too short", "owner@example.com")
            .validate()
            .is_err());
        assert!(request("demo", &"d".repeat(501), "owner@example.com")
            .validate()
            .is_err());
        assert!(request("demo", "a demo application", "owner.example.com")
            .validate()
            .is_err());
        assert!(request("demo", "a demo application", "@example.com")
            .validate()
            .is_err());
    }

    #[test]
    fn test_auth_provider_wire_format() {
        let provider: AuthProvider = serde_json::from_value(json!({
            "app_did": "did:key:app",
            "app_details": {
                "provider_name": "facebook",
                "provider_type": "social",
                "provider_protocol": "oauth2"
            },
            "config": {"client_id": "client"}
        }))
        .unwrap();
        assert_eq!(provider.provider, AvailableProvider::facebook());
        assert_eq!(provider.config.redirect_url, "");
    }

    #[test]
    fn test_json_schema_wire_format() {
        let schema: JsonSchema = serde_json::from_value(json!({
            "$schema": "https://json-schema.org/draft-07/schema",
            "type": "object",
            "properties": {"roles": {"type": "array"}}
        }))
        .unwrap();
        assert!(schema.required.is_empty());
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["$schema"], "https://json-schema.org/draft-07/schema");
        assert!(value.get("required").is_none());
    }
}
