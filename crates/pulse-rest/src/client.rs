//! REST client for gateway URL resolution

use crate::error::RestError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Resolves the WebSocket URL the session should connect to.
///
/// The session depends on this trait rather than the concrete client so that
/// tests can point it at a local mock gateway.
#[async_trait]
pub trait GatewayUrlProvider: Send + Sync {
    /// Resolve the gateway connection URL
    async fn gateway_url(&self) -> Result<String, RestError>;
}

/// Response body of `GET /gateway`
#[derive(Debug, Deserialize)]
struct GatewayUrlResponse {
    url: String,
}

/// HTTP client for the REST API
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl RestClient {
    /// Create a client against the given API base URL
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RestError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl GatewayUrlProvider for RestClient {
    async fn gateway_url(&self) -> Result<String, RestError> {
        let response = self
            .http
            .get(self.url("/gateway"))
            .header("Authorization", format!("Bot {}", self.token))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(RestError::Unauthorized {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(RestError::Status {
                status: status.as_u16(),
            });
        }

        let body: GatewayUrlResponse = response.json().await?;

        tracing::debug!(url = %body.url, "Resolved gateway URL");

        Ok(body.url)
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}
