use std::path::PathBuf;

use anyhow::Context as _;

/// How a single-book lookup reacts when the backend answers with a
/// collection instead of one item (observed drift between revisions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookLookup {
    /// Search the collection for the requested id; absent when no match.
    Search,
    /// Expect a single object; a collection-shaped response counts as absent.
    Direct,
}

impl BookLookup {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "search" => Ok(Self::Search),
            "direct" => Ok(Self::Direct),
            other => anyhow::bail!("unsupported book lookup strategy: {other}"),
        }
    }
}

/// Runtime configuration, read from the environment at startup. A missing
/// API base URL is fatal; everything else has a usable default.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub region: String,
    pub user_pool_id: String,
    pub client_id: String,
    pub idp_endpoint: String,
    pub session_file: PathBuf,
    pub reviews_require_auth: bool,
    pub book_lookup: BookLookup,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_url = std::env::var("LIBRARYAI_API_URL")
            .context("LIBRARYAI_API_URL is required")?;
        let api_url = api_url.trim().trim_end_matches('/').to_string();
        if api_url.is_empty() {
            anyhow::bail!("LIBRARYAI_API_URL is empty");
        }

        let region = env_or_default("LIBRARYAI_AWS_REGION", "us-east-1");
        let user_pool_id = env_or_default("LIBRARYAI_USER_POOL_ID", "");
        let client_id = env_or_default("LIBRARYAI_CLIENT_ID", "");

        let idp_endpoint = match std::env::var("LIBRARYAI_IDP_ENDPOINT") {
            Ok(raw) if !raw.trim().is_empty() => raw.trim().trim_end_matches('/').to_string(),
            _ => format!("https://cognito-idp.{region}.amazonaws.com"),
        };

        let session_file = match std::env::var("LIBRARYAI_SESSION_FILE") {
            Ok(raw) if !raw.trim().is_empty() => PathBuf::from(raw.trim()),
            _ => default_session_file(),
        };

        let reviews_require_auth = parse_bool(
            &env_or_default("LIBRARYAI_REVIEWS_REQUIRE_AUTH", "false"),
        )
        .context("invalid LIBRARYAI_REVIEWS_REQUIRE_AUTH")?;

        let book_lookup = BookLookup::parse(&env_or_default("LIBRARYAI_BOOK_LOOKUP", "search"))
            .context("invalid LIBRARYAI_BOOK_LOOKUP")?;

        Ok(Self {
            api_url,
            region,
            user_pool_id,
            client_id,
            idp_endpoint,
            session_file,
            reviews_require_auth,
            book_lookup,
        })
    }
}

fn env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" => Ok(false),
        "1" | "true" | "yes" => Ok(true),
        other => anyhow::bail!("expected a boolean, got: {other}"),
    }
}

fn default_session_file() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".libraryai").join("session.json")
}
