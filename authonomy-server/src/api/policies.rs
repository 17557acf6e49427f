use crate::errors::ApiError;
use crate::models::{
    ApplicationPolicyRequest, ApplicationPolicyResponse, PolicySchemaRequest, PolicySchemaResponse,
};
use crate::openapi::POLICIES_TAG;
use crate::state::AppState;
use axum::extract::{Json, State};
use axum::routing::{get, post};
use axum::Router;
use log::info;

#[utoipa::path(
    get,
    path = "/policies",
    tag = POLICIES_TAG,
    params(
        ("x-api-key" = String, Header, description = "Owner API key"),
    ),
    responses(
        (status = 200, description = "Stored policy schemas", body = Vec<PolicySchemaResponse>),
    )
)]
pub(crate) async fn list_policies(
    State(state): State<AppState>,
) -> Result<Json<Vec<PolicySchemaResponse>>, ApiError> {
    Ok(Json(state.store.list_policies().await?))
}

#[utoipa::path(
    post,
    path = "/create-policy",
    tag = POLICIES_TAG,
    request_body = PolicySchemaRequest,
    params(
        ("x-api-key" = String, Header, description = "Owner API key"),
    ),
    responses(
        (status = 200, description = "Schema registered", body = PolicySchemaResponse),
        (status = 502, description = "Identity service failure"),
    )
)]
pub(crate) async fn create_policy(
    State(state): State<AppState>,
    Json(request): Json<PolicySchemaRequest>,
) -> Result<Json<PolicySchemaResponse>, ApiError> {
    let policy = state.identity.create_schema(&request).await?;
    state.store.set_policy(&policy).await?;
    info!("Created policy schema '{}' ({})", policy.name, policy.id);
    Ok(Json(policy))
}

/// Issue a policy credential to an application.
///
/// Replaces any policy previously attached to the application.
#[utoipa::path(
    post,
    path = "/attach-policy",
    tag = POLICIES_TAG,
    request_body = ApplicationPolicyRequest,
    params(
        ("x-api-key" = String, Header, description = "Owner API key"),
    ),
    responses(
        (status = 200, description = "Policy attached", body = ApplicationPolicyResponse),
        (status = 400, description = "Unknown schema or DID"),
        (status = 502, description = "Identity service failure"),
    )
)]
pub(crate) async fn attach_policy(
    State(state): State<AppState>,
    Json(request): Json<ApplicationPolicyRequest>,
) -> Result<Json<ApplicationPolicyResponse>, ApiError> {
    if !state.identity.schema_exists(&request.schema_id).await {
        return Err(ApiError::bad_request(format!(
            "Schema '{}' does not exist",
            request.schema_id
        )));
    }
    if !state.identity.did_exists(&request.application_did).await {
        return Err(ApiError::bad_request(format!(
            "Application DID '{}' does not exist",
            request.application_did
        )));
    }
    if !state.identity.did_exists(&request.issuer_did).await {
        return Err(ApiError::bad_request(format!(
            "Issuer DID '{}' does not exist",
            request.issuer_did
        )));
    }

    let credential = state
        .identity
        .issue_credential(
            &request.issuer_did,
            &request.application_did,
            &request.schema_id,
            request.credential,
        )
        .await?;

    let issued = ApplicationPolicyResponse {
        application_did: request.application_did,
        schema_id: request.schema_id,
        issuer_did: request.issuer_did,
        credential_id: credential.id,
    };
    state.store.set_issued_policy(&issued).await?;

    info!(
        "Attached policy {} to application {}",
        issued.schema_id, issued.application_did
    );
    Ok(Json(issued))
}

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/policies", get(list_policies))
        .route("/create-policy", post(create_policy))
        .route("/attach-policy", post(attach_policy))
}
