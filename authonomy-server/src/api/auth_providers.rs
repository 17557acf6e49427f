use crate::errors::ApiError;
use crate::models::{AuthProvider, AvailableProvider, FACEBOOK};
use crate::openapi::PROVIDERS_TAG;
use crate::state::AppState;
use axum::extract::{Json, State};
use axum::routing::{get, post};
use axum::Router;
use http::{header::HOST, HeaderMap};
use log::info;

#[utoipa::path(
    get,
    path = "/auth-provider",
    tag = PROVIDERS_TAG,
    params(
        ("x-api-key" = String, Header, description = "Owner API key"),
    ),
    responses(
        (status = 200, description = "Connectors applications can link", body = Vec<AvailableProvider>),
    )
)]
pub(crate) async fn list_providers() -> Json<Vec<AvailableProvider>> {
    Json(vec![AvailableProvider::facebook()])
}

/// Link a login provider to an application.
///
/// The redirect URL is derived from the Host of the request.
#[utoipa::path(
    post,
    path = "/auth-provider/link",
    tag = PROVIDERS_TAG,
    request_body = AuthProvider,
    params(
        ("x-api-key" = String, Header, description = "Owner API key"),
    ),
    responses(
        (status = 200, description = "Provider linked", body = AuthProvider),
        (status = 400, description = "Unknown application DID or unsupported provider"),
    )
)]
pub(crate) async fn link_provider(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut provider): Json<AuthProvider>,
) -> Result<Json<AuthProvider>, ApiError> {
    if !state.identity.did_exists(&provider.app_did).await {
        return Err(ApiError::bad_request(format!(
            "Application DID '{}' does not exist",
            provider.app_did
        )));
    }
    if provider.provider.provider_name != FACEBOOK {
        return Err(ApiError::bad_request(
            "Only facebook is currently supported as a provider",
        ));
    }

    let host = headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    provider.config.redirect_url = format!(
        "http://{host}/callback/{}/{}",
        provider.provider.provider_name, provider.app_did
    );
    state.store.set_auth_provider(&provider).await?;

    info!(
        "Linked {} to application {}",
        provider.provider.provider_name, provider.app_did
    );
    Ok(Json(provider))
}

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/auth-provider", get(list_providers))
        .route("/auth-provider/link", post(link_provider))
}
