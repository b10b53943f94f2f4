use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog entry as served by the backend. Fields default to empty/zero so
/// a sparsely populated response never fails to deserialize; the access layer
/// normalizes shape, it does not validate content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub description: String,
    pub cover_image: String,
    pub rating: f64,
    pub published_year: i32,
    pub isbn: String,
}

/// Payload for creating a catalog entry (server assigns the id).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub description: String,
    pub cover_image: String,
    pub rating: f64,
    pub published_year: i32,
    pub isbn: String,
}

/// Partial update for a catalog entry; only the set fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// Session identity, rebuilt wholesale on every hydration. The role reflects
/// a token claim and gates visibility only; authorization stays server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Display name for review attribution: name, else the email, else a
    /// fixed anonymous marker.
    pub fn display_name(&self) -> String {
        if !self.name.trim().is_empty() {
            return self.name.clone();
        }
        if !self.email.trim().is_empty() {
            return self.email.clone();
        }
        "Anonymous".to_owned()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadingList {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub book_ids: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReadingList {
    pub user_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingListUpdate {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_ids: Option<Vec<String>>,
}

/// Review submission body. Serializes to exactly the five fields the backend
/// expects; nothing optional, nothing extra.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub book_id: String,
    pub user_id: String,
    pub username: String,
    pub rating: u8,
    pub comment: String,
}

/// One entry of a recommendations response. Backend revisions disagree on
/// whether the book reference field is `bookId` or `id`; both are kept and
/// resolved through [`Recommendation::book_ref`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recommendation {
    #[serde(rename = "bookId", skip_serializing_if = "Option::is_none")]
    pub book_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub reason: String,
    pub confidence: f64,
}

impl Recommendation {
    /// The referenced book id, preferring `bookId` over `id`. Whitespace-only
    /// references count as missing.
    pub fn book_ref(&self) -> Option<&str> {
        for candidate in [self.book_id.as_deref(), self.id.as_deref()] {
            if let Some(raw) = candidate {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed);
                }
            }
        }
        None
    }
}
