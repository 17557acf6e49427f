use crate::errors::ApiError;
use crate::models::{IssueOAuthCredentialRequest, IssueOAuthCredentialResponse, UserInfo};
use crate::openapi::CREDENTIALS_TAG;
use crate::state::AppState;
use authonomy_core::rbac::{self, PolicySubject};
use axum::extract::{Json, State};
use axum::routing::post;
use axum::Router;
use log::info;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

fn to_claims<T: Serialize>(data: &T) -> Result<HashMap<String, Value>, ApiError> {
    serde_json::to_value(data)
        .and_then(serde_json::from_value)
        .map_err(|e| ApiError::internal(format!("Failed to build credential data: {e}")))
}

/// Issue the OAuth and policy credentials of an end user.
///
/// Both credentials are issued by the application to `user_did`. The policy
/// credential grants the default `user` role.
#[utoipa::path(
    post,
    path = "/issue-credential",
    tag = CREDENTIALS_TAG,
    request_body = IssueOAuthCredentialRequest,
    responses(
        (status = 200, description = "Credentials issued", body = IssueOAuthCredentialResponse),
        (status = 400, description = "Provider, schema or application policy not configured"),
        (status = 404, description = "Unknown application"),
        (status = 502, description = "Identity service or provider failure"),
    )
)]
pub(crate) async fn issue_credential(
    State(state): State<AppState>,
    Json(request): Json<IssueOAuthCredentialRequest>,
) -> Result<Json<IssueOAuthCredentialResponse>, ApiError> {
    let schema = state
        .store
        .get_provider_schema(&request.provider)
        .await?
        .ok_or_else(|| {
            ApiError::bad_request(format!("No schema configured for provider '{}'", request.provider))
        })?;
    if !state.identity.schema_exists(&schema.schema_id).await {
        return Err(ApiError::bad_request(format!(
            "Schema '{}' does not exist",
            schema.schema_id
        )));
    }

    let app = state
        .store
        .get_application(&request.app_did)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Application '{}' not found", request.app_did)))?;
    let policy = state
        .store
        .get_issued_policy(&app.app_did)
        .await?
        .ok_or_else(|| {
            ApiError::bad_request(format!("No policy attached to application '{}'", app.app_did))
        })?;
    if !state.identity.did_exists(&app.app_did).await {
        return Err(ApiError::bad_request(format!(
            "Application DID '{}' does not exist",
            app.app_did
        )));
    }

    let user = state
        .provider
        .user_info(&request.provider, &request.access_token)
        .await?;

    let oauth_data = to_claims(&UserInfo {
        user_id: user.id,
        name: user.name,
    })?;
    let oauth_credential = state
        .identity
        .issue_credential(&app.app_did, &request.user_did, &schema.schema_id, oauth_data)
        .await?;

    let policy_data = to_claims(&PolicySubject {
        roles: vec![rbac::default_role()],
    })?;
    let policy_credential = state
        .identity
        .issue_credential(&app.app_did, &request.user_did, &policy.schema_id, policy_data)
        .await?;

    info!(
        "Issued {} credentials {} and {} to {}",
        request.provider, oauth_credential.id, policy_credential.id, request.user_did
    );
    Ok(Json(IssueOAuthCredentialResponse {
        oauth_credential,
        policy_credential,
    }))
}

pub(super) fn router() -> Router<AppState> {
    Router::new().route("/issue-credential", post(issue_credential))
}
