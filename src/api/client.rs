use std::sync::Arc;

use reqwest::Method;

use crate::api::error::ApiError;
use crate::identity::{self, IdentityProvider};

/// Normalized response payload. The backend does not commit to JSON framing
/// on every endpoint, so the body is read as text first and downgraded to
/// `Text` when it does not parse.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(serde_json::Value),
    Text(String),
}

/// Per-request auth requirement. `Required` resolves a token up front and
/// fails fast when none is available; an authenticated call is never silently
/// downgraded to an unauthenticated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    None,
    Required,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    identity: Arc<dyn IdentityProvider>,
}

impl ApiClient {
    pub fn new(base_url: &str, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            identity,
        }
    }

    /// Unauthenticated GET. Non-success statuses surface as `ApiError::Api`;
    /// soft-fail policy for single-item lookups lives in the gateways.
    pub async fn get_public(&self, path: &str) -> Result<Body, ApiError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%url, "GET (public)");
        let response = self.http.get(&url).send().await?;
        normalize(response).await
    }

    /// Request with an explicit auth requirement and optional JSON body.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        auth: Auth,
    ) -> Result<Body, ApiError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%url, method = %method, auth = ?auth, "API request");

        let mut request = self
            .http
            .request(method, &url)
            .header("Content-Type", "application/json");

        if auth == Auth::Required {
            let token = identity::id_token(self.identity.as_ref())
                .await
                .ok_or(ApiError::Unauthenticated)?;
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        normalize(response).await
    }
}

/// Read text first, map failure statuses to `ApiError`, then attempt JSON
/// with a raw-text fallback.
async fn normalize(response: reqwest::Response) -> Result<Body, ApiError> {
    let status = response.status();
    let raw = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::from_status(status.as_u16(), &raw));
    }
    if raw.is_empty() {
        return Ok(Body::Empty);
    }
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Body::Json(value)),
        Err(_) => Ok(Body::Text(raw)),
    }
}

/// Percent-encode a value for use as a path segment or query value,
/// equivalent to the original frontend's `encodeURIComponent` calls.
pub fn encode_segment(raw: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(raw.as_bytes()).collect();
    encoded.replace('+', "%20")
}
