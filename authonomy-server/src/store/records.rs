//! Typed access to the records kept in the store

use super::{StorageBackend, Store, StoreError};
use crate::models::{
    ApplicationPolicyResponse, ApplicationResponse, AuthProvider, PolicySchemaResponse,
    ProviderSchema,
};
use async_trait::async_trait;
use authonomy_core::{ApplicationDirectory, ApplicationRecord, DirectoryError};
use serde_json::{Map, Value};

const APP_PREFIX: &str = "app-";
const POLICY_PREFIX: &str = "policy-";
const ISSUED_POLICY_PREFIX: &str = "issued-";
const AUTH_PREFIX: &str = "auth-";
const PROVIDER_SCHEMA_PREFIX: &str = "prov-";

impl Store {
    pub async fn set_application(&self, app: &ApplicationResponse) -> Result<(), StoreError> {
        self.set(&format!("{APP_PREFIX}{}", app.app_did), app).await
    }

    pub async fn get_application(
        &self,
        app_did: &str,
    ) -> Result<Option<ApplicationResponse>, StoreError> {
        self.get(&format!("{APP_PREFIX}{app_did}")).await
    }

    pub async fn list_applications(&self) -> Result<Vec<ApplicationResponse>, StoreError> {
        self.list(APP_PREFIX).await
    }

    pub async fn set_policy(&self, policy: &PolicySchemaResponse) -> Result<(), StoreError> {
        self.set(&format!("{POLICY_PREFIX}{}", policy.id), policy).await
    }

    pub async fn list_policies(&self) -> Result<Vec<PolicySchemaResponse>, StoreError> {
        self.list(POLICY_PREFIX).await
    }

    /// An application holds at most one issued policy; a new one replaces the old
    pub async fn set_issued_policy(
        &self,
        policy: &ApplicationPolicyResponse,
    ) -> Result<(), StoreError> {
        self.set(
            &format!("{ISSUED_POLICY_PREFIX}{}", policy.application_did),
            policy,
        )
        .await
    }

    pub async fn get_issued_policy(
        &self,
        app_did: &str,
    ) -> Result<Option<ApplicationPolicyResponse>, StoreError> {
        self.get(&format!("{ISSUED_POLICY_PREFIX}{app_did}")).await
    }

    pub async fn set_auth_provider(&self, provider: &AuthProvider) -> Result<(), StoreError> {
        self.set(&format!("{AUTH_PREFIX}{}", provider.app_did), provider)
            .await
    }

    pub async fn get_auth_provider(
        &self,
        app_did: &str,
    ) -> Result<Option<AuthProvider>, StoreError> {
        self.get(&format!("{AUTH_PREFIX}{app_did}")).await
    }

    pub async fn set_provider_schema(&self, schema: &ProviderSchema) -> Result<(), StoreError> {
        self.set(
            &format!("{PROVIDER_SCHEMA_PREFIX}{}", schema.provider_name),
            schema,
        )
        .await
    }

    pub async fn get_provider_schema(
        &self,
        provider_name: &str,
    ) -> Result<Option<ProviderSchema>, StoreError> {
        self.get(&format!("{PROVIDER_SCHEMA_PREFIX}{provider_name}"))
            .await
    }
}

impl From<ApplicationResponse> for ApplicationRecord {
    fn from(app: ApplicationResponse) -> Self {
        let mut details = Map::new();
        details.insert(
            "description".to_string(),
            Value::String(app.app_details.description),
        );
        details.insert("email".to_string(), Value::String(app.app_details.email));
        Self {
            did: app.app_did,
            name: app.app_name,
            details,
        }
    }
}

#[async_trait]
impl ApplicationDirectory for Store {
    async fn get_application(&self, did: &str) -> Result<Option<ApplicationRecord>, DirectoryError> {
        Store::get_application(self, did)
            .await
            .map(|app| app.map(ApplicationRecord::from))
            .map_err(|e| DirectoryError(e.to_string()))
    }
}
