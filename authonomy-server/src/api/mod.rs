pub(crate) mod access;
pub(crate) mod applications;
pub(crate) mod auth_providers;
pub(crate) mod authn_middleware;
pub(crate) mod credentials;
pub(crate) mod health;
pub(crate) mod policies;

use crate::api::authn_middleware::api_key_middleware;
use crate::state::AppState;
use axum::{middleware, Router};

/// Combines all API routes into a single router
pub(super) fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(credentials::router())
        .merge(access::router())
        .merge(owner_routes(state))
}

/// Management routes that require the owner API key
fn owner_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(applications::router())
        .merge(auth_providers::router())
        .merge(policies::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        ))
}
