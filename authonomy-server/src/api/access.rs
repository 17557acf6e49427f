use crate::errors::ApiError;
use crate::models::{GetAccessTokenRequest, GetAccessTokenResponse};
use crate::openapi::ACCESS_TAG;
use crate::state::AppState;
use authonomy_core::CredentialBundle;
use axum::extract::{Json, Query, State};
use axum::routing::{get, post};
use axum::Router;
use http::header::AUTHORIZATION;
use http::HeaderMap;
use log::info;
use serde::Deserialize;
use utoipa::IntoParams;

/// Exchange an application's credential tokens for a bearer access token
#[utoipa::path(
    post,
    path = "/get-access-token",
    tag = ACCESS_TAG,
    request_body = GetAccessTokenRequest,
    responses(
        (status = 200, description = "Bearer token issued", body = GetAccessTokenResponse),
        (status = 400, description = "A credential is malformed or was issued by another DID"),
    )
)]
pub(crate) async fn get_access_token(
    State(state): State<AppState>,
    Json(request): Json<GetAccessTokenRequest>,
) -> Result<Json<GetAccessTokenResponse>, ApiError> {
    let credentials = CredentialBundle::new(request.oauth_credential, request.policy_credential);
    let access_token = state.authorizer.exchange(&request.app_did, credentials).await?;

    info!("Issued access token to application {}", request.app_did);
    Ok(Json(GetAccessTokenResponse { access_token }))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct ValidateAccessQuery {
    /// Role the bearer must hold
    #[serde(default)]
    attribute: String,
}

/// Check that the bearer holds a role
#[utoipa::path(
    get,
    path = "/validate-access",
    tag = ACCESS_TAG,
    params(
        ValidateAccessQuery,
        ("Authorization" = String, Header, description = "Bearer access token"),
    ),
    responses(
        (status = 200, description = "Access granted", body = String),
        (status = 400, description = "A credential in the token is malformed or was issued by another DID"),
        (status = 401, description = "Missing, invalid or expired bearer token"),
        (status = 403, description = "Role not granted"),
        (status = 404, description = "The application of the token is unknown"),
    )
)]
pub(crate) async fn validate_access(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ValidateAccessQuery>,
) -> Result<Json<&'static str>, ApiError> {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    state
        .authorizer
        .authorize(authorization, &query.attribute)
        .await?;
    Ok(Json("success"))
}

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/get-access-token", post(get_access_token))
        .route("/validate-access", get(validate_access))
}

#[cfg(test)]
mod tests {
    use crate::models::GetAccessTokenResponse;
    use crate::test_utils::{credential_jwt, TestFixture};
    use authonomy_core::{AccessTokenManager, CredentialBundle, SigningKey};
    use chrono::{TimeDelta, Utc};
    use http::StatusCode;
    use serde_json::json;

    const APP_DID: &str = "did:key:z6Mkapp";

    fn oauth_credential(issuer: &str) -> String {
        credential_jwt(issuer, json!({"user_id": "1234", "name": "Ada Lovelace"}))
    }

    fn policy_credential(issuer: &str, role: &str) -> String {
        credential_jwt(
            issuer,
            json!({"roles": [{"roleName": role, "permissions": ["view_content"]}]}),
        )
    }

    async fn exchange(fixture: &TestFixture, oauth: String, policy: String) -> crate::test_utils::TestResponse {
        fixture
            .post_without_key(
                "/get-access-token",
                &json!({
                    "app_did": APP_DID,
                    "oauth_credential": oauth,
                    "policy_credential": policy
                }),
            )
            .await
    }

    async fn access_token(fixture: &TestFixture, role: &str) -> String {
        let response = exchange(
            fixture,
            oauth_credential(APP_DID),
            policy_credential(APP_DID, role),
        )
        .await;
        response.assert_ok();
        response.json_as::<GetAccessTokenResponse>().access_token
    }

    async fn validate(fixture: &TestFixture, attribute: &str, authorization: Option<String>) -> crate::test_utils::TestResponse {
        let uri = format!("/validate-access?attribute={attribute}");
        match authorization {
            Some(value) => {
                fixture
                    .get_with_headers(&uri, &[("authorization", value.as_str())])
                    .await
            }
            None => fixture.get_without_key(&uri).await,
        }
    }

    #[tokio::test]
    async fn test_granted_role() {
        let fixture = TestFixture::new().await;
        fixture.seed_application(APP_DID).await;
        let token = access_token(&fixture, "user").await;

        let response = validate(&fixture, "user", Some(format!("Bearer {token}"))).await;
        response.assert_ok();
        assert_eq!(response.json, json!("success"));
    }

    #[tokio::test]
    async fn test_role_not_granted() {
        let fixture = TestFixture::new().await;
        fixture.seed_application(APP_DID).await;
        let token = access_token(&fixture, "user").await;

        let response = validate(&fixture, "admin", Some(format!("Bearer {token}"))).await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_missing_attribute_is_forbidden() {
        let fixture = TestFixture::new().await;
        fixture.seed_application(APP_DID).await;
        let token = access_token(&fixture, "user").await;

        let response = fixture
            .get_with_headers("/validate-access", &[("authorization", &format!("Bearer {token}"))])
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_bearer_required() {
        let fixture = TestFixture::new().await;
        fixture.seed_application(APP_DID).await;
        let token = access_token(&fixture, "user").await;

        validate(&fixture, "user", None)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        validate(&fixture, "user", Some(format!("Token {token}")))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        validate(&fixture, "user", Some("Bearer not-a-token".to_string()))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_token() {
        let fixture = TestFixture::new().await;
        fixture.seed_application(APP_DID).await;
        let tokens = AccessTokenManager::new(
            SigningKey::from_secret(&fixture.config.jwt_encryption_key).unwrap(),
        );
        let issued_at = Utc::now() - TimeDelta::hours(25);
        let token = tokens
            .issue_at(
                APP_DID,
                CredentialBundle::new(oauth_credential(APP_DID), policy_credential(APP_DID, "user")),
                issued_at,
            )
            .unwrap();

        let response = validate(&fixture, "user", Some(format!("Bearer {token}"))).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_application() {
        let fixture = TestFixture::new().await;
        let token = access_token(&fixture, "user").await;

        let response = validate(&fixture, "user", Some(format!("Bearer {token}"))).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_exchange_rejects_foreign_issuer() {
        let fixture = TestFixture::new().await;
        let response = exchange(
            &fixture,
            oauth_credential(APP_DID),
            policy_credential("did:key:z6Mkother", "user"),
        )
        .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_exchange_rejects_malformed_credential() {
        let fixture = TestFixture::new().await;
        let response = exchange(
            &fixture,
            "not-a-jwt".to_string(),
            policy_credential(APP_DID, "user"),
        )
        .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
