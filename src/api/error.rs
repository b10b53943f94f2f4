use thiserror::Error;

/// Failures surfaced by the access layer. Soft-failing lookups never produce
/// these; they collapse absence into `None` at the gateway instead.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An authenticated call was attempted with no resolvable token. Raised
    /// before any network traffic.
    #[error("not authenticated")]
    Unauthenticated,

    /// Non-success HTTP status from the backend. `message` carries the raw
    /// response body for display and logging.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The request never completed (connection, DNS, timeout).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response could not be shaped into the expected type, on an
    /// operation that must propagate rather than soft-fail.
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build the status error, falling back to a status-coded message when
    /// the body is empty.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            format!("API request failed ({status})")
        } else {
            body.to_owned()
        };
        Self::Api { status, message }
    }
}
