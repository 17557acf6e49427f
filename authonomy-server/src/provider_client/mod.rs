//! Social login providers

use crate::config::ProviderConfig;
use crate::models::FACEBOOK;
use http::StatusCode;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Provider request failed with status code: {0}")]
    UnexpectedStatus(StatusCode),
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Profile of the user owning a provider access token
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProviderUserInfo {
    pub id: String,
    pub name: String,
}

#[derive(Clone)]
pub struct ProviderClient {
    client: Client,
    graph_url: String,
}

impl ProviderClient {
    pub fn new(client: Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            graph_url: config.graph_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolve the profile behind `access_token`. Only facebook is supported.
    pub async fn user_info(
        &self,
        provider: &str,
        access_token: &str,
    ) -> Result<ProviderUserInfo, ProviderError> {
        if provider != FACEBOOK {
            return Err(ProviderError::UnsupportedProvider(provider.to_string()));
        }

        let response = self
            .client
            .get(format!("{}/me", self.graph_url))
            .query(&[("access_token", access_token)])
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            warn!("{} user info request failed: {}", provider, response.status());
            return Err(ProviderError::UnexpectedStatus(response.status()));
        }

        let user: ProviderUserInfo = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        debug!("Resolved {} user {}", provider, user.id);
        Ok(user)
    }
}
