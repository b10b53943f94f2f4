use std::sync::Arc;

use reqwest::Method;

use crate::api::client::{ApiClient, Auth, Body, encode_segment};
use crate::api::error::ApiError;
use crate::config::BookLookup;
use crate::model::{Book, BookUpdate, NewBook};

/// Book catalog gateway. Reads are public; writes require authentication.
pub struct Catalog {
    client: Arc<ApiClient>,
    lookup: BookLookup,
}

impl Catalog {
    pub fn new(client: Arc<ApiClient>, lookup: BookLookup) -> Self {
        Self { client, lookup }
    }

    /// Fetch the whole catalog. Errors propagate: a failed listing is shown
    /// to the user, not papered over.
    pub async fn list(&self) -> Result<Vec<Book>, ApiError> {
        match self.client.get_public("/books").await? {
            Body::Json(value) => serde_json::from_value(value)
                .map_err(|err| ApiError::Decode(format!("book list: {err}"))),
            Body::Empty => Ok(Vec::new()),
            Body::Text(raw) => Err(ApiError::Decode(format!(
                "book list: expected JSON, got text ({} bytes)",
                raw.len()
            ))),
        }
    }

    /// Fetch one book by id. Soft-fails: any non-success status, unusable
    /// shape, or failed match resolves to `None` so callers can branch on
    /// absence without error handling. Transport failures still propagate.
    pub async fn get(&self, id: &str) -> Result<Option<Book>, ApiError> {
        let path = format!("/books/{}", encode_segment(id));
        let body = match self.client.get_public(&path).await {
            Ok(body) => body,
            Err(ApiError::Api { status, .. }) => {
                tracing::debug!(id, status, "book lookup soft-failed");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let Body::Json(value) = body else {
            return Ok(None);
        };
        Ok(resolve_single(value, id, self.lookup))
    }

    pub async fn create(&self, book: &NewBook) -> Result<Option<Book>, ApiError> {
        let payload = serde_json::to_value(book)
            .map_err(|err| ApiError::Decode(format!("serialize book: {err}")))?;
        let body = self
            .client
            .send(Method::POST, "/books", Some(&payload), Auth::Required)
            .await?;
        Ok(parse_book(body))
    }

    pub async fn update(&self, id: &str, patch: &BookUpdate) -> Result<Option<Book>, ApiError> {
        let path = format!("/books/{}", encode_segment(id));
        let payload = serde_json::to_value(patch)
            .map_err(|err| ApiError::Decode(format!("serialize book patch: {err}")))?;
        let body = self
            .client
            .send(Method::PUT, &path, Some(&payload), Auth::Required)
            .await?;
        Ok(parse_book(body))
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/books/{}", encode_segment(id));
        self.client
            .send(Method::DELETE, &path, None, Auth::Required)
            .await?;
        Ok(())
    }
}

/// Some backend revisions answer a single-book GET with a collection. The
/// lookup strategy decides what that means; it is configured, not guessed.
fn resolve_single(value: serde_json::Value, id: &str, lookup: BookLookup) -> Option<Book> {
    if let serde_json::Value::Array(items) = value {
        return match lookup {
            BookLookup::Search => items
                .into_iter()
                .find(|item| item.get("id").and_then(|v| v.as_str()) == Some(id))
                .and_then(|item| serde_json::from_value(item).ok()),
            BookLookup::Direct => {
                tracing::debug!(id, "collection-shaped single-book response; treating as absent");
                None
            }
        };
    }
    serde_json::from_value(value).ok()
}

fn parse_book(body: Body) -> Option<Book> {
    match body {
        Body::Json(value) => serde_json::from_value(value).ok(),
        _ => None,
    }
}
