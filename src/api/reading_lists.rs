use std::sync::Arc;

use reqwest::Method;

use crate::api::client::{ApiClient, Auth, Body, encode_segment};
use crate::api::error::ApiError;
use crate::model::{NewReadingList, ReadingList, ReadingListUpdate};

/// Reading list gateway. Every operation is scoped to one user and requires
/// authentication.
pub struct ReadingLists {
    client: Arc<ApiClient>,
}

impl ReadingLists {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn for_user(&self, user_id: &str) -> Result<Vec<ReadingList>, ApiError> {
        let path = format!("/reading-lists?userId={}", encode_segment(user_id));
        match self.client.send(Method::GET, &path, None, Auth::Required).await? {
            Body::Json(value) => serde_json::from_value(value)
                .map_err(|err| ApiError::Decode(format!("reading lists: {err}"))),
            Body::Empty => Ok(Vec::new()),
            Body::Text(raw) => Err(ApiError::Decode(format!(
                "reading lists: expected JSON, got text ({} bytes)",
                raw.len()
            ))),
        }
    }

    pub async fn create(&self, list: &NewReadingList) -> Result<Option<ReadingList>, ApiError> {
        let payload = serde_json::to_value(list)
            .map_err(|err| ApiError::Decode(format!("serialize reading list: {err}")))?;
        let body = self
            .client
            .send(Method::POST, "/reading-lists", Some(&payload), Auth::Required)
            .await?;
        Ok(parse_list(body))
    }

    pub async fn update(
        &self,
        id: &str,
        patch: &ReadingListUpdate,
    ) -> Result<Option<ReadingList>, ApiError> {
        let path = format!("/reading-lists/{}", encode_segment(id));
        let payload = serde_json::to_value(patch)
            .map_err(|err| ApiError::Decode(format!("serialize reading list patch: {err}")))?;
        let body = self
            .client
            .send(Method::PUT, &path, Some(&payload), Auth::Required)
            .await?;
        Ok(parse_list(body))
    }

    pub async fn delete(&self, id: &str, user_id: &str) -> Result<(), ApiError> {
        let path = format!(
            "/reading-lists/{}?userId={}",
            encode_segment(id),
            encode_segment(user_id)
        );
        self.client
            .send(Method::DELETE, &path, None, Auth::Required)
            .await?;
        Ok(())
    }
}

fn parse_list(body: Body) -> Option<ReadingList> {
    match body {
        Body::Json(value) => serde_json::from_value(value).ok(),
        _ => None,
    }
}
