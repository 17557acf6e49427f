use crate::errors::ApiError;
use crate::models::{ApplicationRequest, ApplicationResponse};
use crate::openapi::APPLICATIONS_TAG;
use crate::state::AppState;
use axum::extract::{Json, Path, State};
use axum::routing::get;
use axum::Router;
use log::info;

#[utoipa::path(
    get,
    path = "/applications",
    tag = APPLICATIONS_TAG,
    params(
        ("x-api-key" = String, Header, description = "Owner API key"),
    ),
    responses(
        (status = 200, description = "Registered applications", body = Vec<ApplicationResponse>),
        (status = 401, description = "Missing API key"),
        (status = 403, description = "Invalid API key"),
    )
)]
pub(crate) async fn list_applications(
    State(state): State<AppState>,
) -> Result<Json<Vec<ApplicationResponse>>, ApiError> {
    Ok(Json(state.store.list_applications().await?))
}

/// Register an application and give it a fresh DID
#[utoipa::path(
    post,
    path = "/applications",
    tag = APPLICATIONS_TAG,
    request_body = ApplicationRequest,
    params(
        ("x-api-key" = String, Header, description = "Owner API key"),
    ),
    responses(
        (status = 200, description = "Application registered", body = ApplicationResponse),
        (status = 400, description = "Invalid application details"),
        (status = 502, description = "Identity service failure"),
    )
)]
pub(crate) async fn create_application(
    State(state): State<AppState>,
    Json(request): Json<ApplicationRequest>,
) -> Result<Json<ApplicationResponse>, ApiError> {
    request.validate().map_err(ApiError::bad_request)?;

    let app_did = state.identity.create_did().await?;
    let application = ApplicationResponse {
        app_did,
        app_name: request.app_name,
        app_details: request.app_details,
    };
    state.store.set_application(&application).await?;

    info!(
        "Registered application '{}' as {}",
        application.app_name, application.app_did
    );
    Ok(Json(application))
}

#[utoipa::path(
    get,
    path = "/applications/{app_did}",
    tag = APPLICATIONS_TAG,
    params(
        ("app_did" = String, Path, description = "DID of the application"),
        ("x-api-key" = String, Header, description = "Owner API key"),
    ),
    responses(
        (status = 200, description = "The application", body = ApplicationResponse),
        (status = 404, description = "Unknown application"),
    )
)]
pub(crate) async fn get_application(
    State(state): State<AppState>,
    Path(app_did): Path<String>,
) -> Result<Json<ApplicationResponse>, ApiError> {
    state
        .store
        .get_application(&app_did)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Application '{app_did}' not found")))
}

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/applications",
            get(list_applications).post(create_application),
        )
        .route("/applications/{app_did}", get(get_application))
}
