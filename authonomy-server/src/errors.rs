use crate::identity_client::IdentityServiceError;
use crate::provider_client::ProviderError;
use crate::store::StoreError;
use authonomy_core::{AuthorizationError, AuthorizationOutcome};
use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use log::error;
use serde_json::json;

#[derive(Debug, Clone)]
pub struct ApiError {
    pub detail: String,
    pub status_code: StatusCode,
}

impl ApiError {
    /// Create a new ApiError with a detail message and status code
    pub fn new<S: ToString>(detail: S, status_code: StatusCode) -> Self {
        Self {
            detail: detail.to_string(),
            status_code,
        }
    }

    /// Create new Internal Server Error (500) with a detail message
    pub fn internal<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Create new Bad Request Error (400) with a detail message
    pub fn bad_request<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::BAD_REQUEST)
    }

    /// Create new Unauthorized Error (401) with a detail message
    pub fn unauthorized<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::UNAUTHORIZED)
    }

    /// Create new Forbidden Error (403) with a detail message
    pub fn forbidden<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::FORBIDDEN)
    }

    /// Create new Not Found Error (404) with a detail message
    pub fn not_found<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::NOT_FOUND)
    }

    /// Create new Bad Gateway (502) with a detail message
    pub fn bad_gateway<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::BAD_GATEWAY)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code;
        let body = json!({
            "detail": self.detail,
        });
        (status_code, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        error!("Store error: {}", err);
        Self::internal(format!("Storage failure: {err}"))
    }
}

impl From<IdentityServiceError> for ApiError {
    fn from(err: IdentityServiceError) -> Self {
        error!("Identity service error: {}", err);
        Self::bad_gateway(format!("Identity service failure: {err}"))
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::UnsupportedProvider(_) => Self::bad_request(err),
            _ => {
                error!("Auth provider error: {}", err);
                Self::bad_gateway(format!("Auth provider failure: {err}"))
            }
        }
    }
}

impl From<AuthorizationError> for ApiError {
    fn from(err: AuthorizationError) -> Self {
        match err.outcome() {
            AuthorizationOutcome::Unauthenticated => Self::unauthorized(format!("Unauthorized: {err}")),
            AuthorizationOutcome::NotFound => Self::not_found(err),
            AuthorizationOutcome::IntegrityError => Self::bad_request(err),
            AuthorizationOutcome::Forbidden => Self::forbidden(err),
            AuthorizationOutcome::Allowed | AuthorizationOutcome::Unavailable => {
                error!("Authorization could not be completed: {}", err);
                Self::internal(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authonomy_core::AccessTokenError;

    #[test]
    fn test_authorization_error_status() {
        let cases = [
            (AuthorizationError::MissingBearer, StatusCode::UNAUTHORIZED),
            (
                AuthorizationError::InvalidToken(AccessTokenError::Expired),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AuthorizationError::ApplicationNotFound("did:key:x".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                AuthorizationError::RoleNotFound("admin".to_string()),
                StatusCode::FORBIDDEN,
            ),
            (
                AuthorizationError::Issue(AccessTokenError::Signing("boom".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code, status);
        }
    }

    #[test]
    fn test_unsupported_provider_is_bad_request() {
        let err = ApiError::from(ProviderError::UnsupportedProvider("github".to_string()));
        assert_eq!(err.status_code, StatusCode::BAD_REQUEST);
        assert!(err.detail.contains("github"));
    }
}
