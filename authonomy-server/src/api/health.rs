use crate::openapi::HEALTH_TAG;
use crate::state::AppState;
use crate::store::StorageBackend;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use log::warn;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum HealthStatusType {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatusType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub status_code: StatusCode,
}

impl HealthResponse {
    fn ok() -> Self {
        Self {
            status: HealthStatusType::Ok,
            error: None,
            status_code: StatusCode::OK,
        }
    }
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        let status_code = self.status_code;
        (status_code, Json(self)).into_response()
    }
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub(crate) async fn health_check() -> HealthResponse {
    HealthResponse::ok()
}

/// Readiness check, fails while the store is unreachable
#[utoipa::path(
    get,
    path = "/ready",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse),
        (status = 503, description = "Store is not reachable", body = HealthResponse)
    )
)]
pub(crate) async fn ready_check(State(state): State<AppState>) -> HealthResponse {
    match state.store.health_check().await {
        Ok(()) => HealthResponse::ok(),
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            HealthResponse {
                status: HealthStatusType::Error,
                error: Some(e),
                status_code: StatusCode::SERVICE_UNAVAILABLE,
            }
        }
    }
}

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
}
