use std::sync::Arc;

use reqwest::Method;

use crate::api::client::{ApiClient, Auth, Body};
use crate::api::error::ApiError;
use crate::model::Recommendation;

/// Cap on envelope unwrapping. The deepest observed nesting is an object
/// whose `body` field holds a JSON-encoded string of the sequence.
const MAX_UNWRAP_DEPTH: u8 = 4;

/// AI recommendations gateway. The endpoint's response shape has drifted
/// across backend revisions; every observed variant is unwrapped here so no
/// shape-sniffing leaks into callers.
pub struct Recommender {
    client: Arc<ApiClient>,
}

impl Recommender {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn request(&self, query: &str) -> Result<Vec<Recommendation>, ApiError> {
        let payload = serde_json::json!({ "query": query });
        let body = self
            .client
            .send(Method::POST, "/recommendations", Some(&payload), Auth::Required)
            .await?;
        Ok(unwrap_recommendations(body))
    }
}

/// Reduce any observed response shape to the canonical sequence:
/// a bare array, `{"recommendations": [...]}`, `{"body": "<json string>"}`,
/// or a bare JSON-encoded string. Anything that fails to unwrap yields an
/// empty sequence rather than an error.
pub fn unwrap_recommendations(body: Body) -> Vec<Recommendation> {
    let value = match body {
        Body::Empty => return Vec::new(),
        Body::Json(value) => value,
        Body::Text(raw) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(_) => return Vec::new(),
        },
    };
    unwrap_value(value, MAX_UNWRAP_DEPTH)
}

fn unwrap_value(value: serde_json::Value, depth: u8) -> Vec<Recommendation> {
    if depth == 0 {
        return Vec::new();
    }
    match value {
        serde_json::Value::Array(_) => serde_json::from_value(value).unwrap_or_default(),
        serde_json::Value::String(inner) => match serde_json::from_str(&inner) {
            Ok(parsed) => unwrap_value(parsed, depth - 1),
            Err(_) => Vec::new(),
        },
        serde_json::Value::Object(mut map) => {
            if let Some(recs) = map.remove("recommendations") {
                return unwrap_value(recs, depth - 1);
            }
            if let Some(envelope) = map.remove("body") {
                return unwrap_value(envelope, depth - 1);
            }
            Vec::new()
        }
        _ => Vec::new(),
    }
}
