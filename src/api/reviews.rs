use std::sync::Arc;

use reqwest::Method;

use crate::api::client::{ApiClient, Auth};
use crate::api::error::ApiError;
use crate::model::NewReview;

/// Review gateway. The observed backend revision accepts review writes
/// without authentication, unlike the rest of the write surface; the
/// requirement is configured per deployment rather than hardcoded.
pub struct Reviews {
    client: Arc<ApiClient>,
    require_auth: bool,
}

impl Reviews {
    pub fn new(client: Arc<ApiClient>, require_auth: bool) -> Self {
        Self {
            client,
            require_auth,
        }
    }

    pub async fn create(&self, review: &NewReview) -> Result<(), ApiError> {
        let auth = if self.require_auth {
            Auth::Required
        } else {
            Auth::None
        };
        let payload = serde_json::to_value(review)
            .map_err(|err| ApiError::Decode(format!("serialize review: {err}")))?;
        self.client
            .send(Method::POST, "/reviews", Some(&payload), auth)
            .await?;
        Ok(())
    }
}
