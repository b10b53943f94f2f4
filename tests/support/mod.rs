#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use libraryai::config::{BookLookup, Config};
use libraryai::identity::{IdentityProvider, SessionTokens};

/// Identity provider with a fixed token (or none), for exercising the API
/// layer without an identity backend.
pub struct TestIdentity {
    token: Option<String>,
}

impl TestIdentity {
    pub fn signed_out() -> Self {
        Self { token: None }
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Some(token.to_owned()),
        }
    }
}

#[async_trait]
impl IdentityProvider for TestIdentity {
    async fn sign_in(&self, _username: &str, _password: &str) -> anyhow::Result<()> {
        Ok(())
    }

    async fn sign_up(
        &self,
        _username: &str,
        _password: &str,
        _attributes: &[(String, String)],
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn confirm_sign_up(&self, _username: &str, _code: &str) -> anyhow::Result<()> {
        Ok(())
    }

    async fn sign_out(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn fetch_session(&self) -> anyhow::Result<Option<SessionTokens>> {
        Ok(self.token.as_ref().map(|token| SessionTokens {
            id_token: token.clone(),
            access_token: token.clone(),
            refresh_token: None,
            expires_at: Utc::now() + Duration::hours(1),
        }))
    }

    async fn fetch_user_attributes(&self) -> anyhow::Result<HashMap<String, String>> {
        anyhow::bail!("no active session")
    }
}

pub fn test_config(api_url: &str) -> Config {
    Config {
        api_url: api_url.trim_end_matches('/').to_string(),
        region: "local".to_owned(),
        user_pool_id: "local_pool".to_owned(),
        client_id: "test-client".to_owned(),
        idp_endpoint: "http://127.0.0.1:9".to_owned(),
        session_file: PathBuf::from("/nonexistent/session.json"),
        reviews_require_auth: false,
        book_lookup: BookLookup::Search,
    }
}
