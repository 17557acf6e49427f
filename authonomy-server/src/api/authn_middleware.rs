use crate::errors::ApiError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::warn;

/// Header carrying the owner API key
pub(crate) const API_KEY_HEADER: &str = "x-api-key";

/// Guards the owner routes with the configured API key
pub(super) async fn api_key_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(header) = request.headers().get(API_KEY_HEADER) else {
        warn!("Missing {} header", API_KEY_HEADER);
        return ApiError::unauthorized("Missing API key").into_response();
    };

    match header.to_str() {
        Ok(api_key) if api_key == state.config.api_key => next.run(request).await,
        Ok(_) => {
            warn!("Authentication failed: Invalid API key");
            ApiError::forbidden("Invalid API key").into_response()
        }
        Err(e) => {
            warn!("Failed to parse {} header to string: {}", API_KEY_HEADER, e);
            ApiError::forbidden("Invalid API key").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{memory::InMemoryStore, Store};
    use crate::config::AuthonomyConfig;
    use axum::routing::get;
    use axum::{middleware, Router};
    use http::StatusCode;
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use wiremock::MockServer;

    async fn setup_mock_app() -> Router {
        let identity_mock = MockServer::start().await;
        let provider_mock = MockServer::start().await;
        let config = AuthonomyConfig::for_test_with_mocks(&identity_mock, &provider_mock);
        let state = AppState::with_store(config, Store::InMemory(InMemoryStore::new())).unwrap();

        Router::new()
            .route("/protected", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                api_key_middleware,
            ))
            .with_state(state)
    }

    async fn send_request(app: Router, api_key: Option<&str>) -> (StatusCode, String) {
        let mut builder = http::Request::builder().uri("/protected");
        if let Some(api_key) = api_key {
            builder = builder.header(API_KEY_HEADER, api_key);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_valid_api_key() {
        let app = setup_mock_app().await;
        let (status, body) = send_request(app, Some("test_api_key")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let app = setup_mock_app().await;
        let (status, body) = send_request(app, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Missing API key"));
    }

    #[tokio::test]
    async fn test_wrong_api_key() {
        let app = setup_mock_app().await;
        let (status, _) = send_request(app, Some("not-the-key")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
