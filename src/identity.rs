use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use async_trait::async_trait;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::config::Config;

/// Tokens for one resolved session. `expires_at` is derived from the
/// provider's `ExpiresIn` at issue time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    pub id_token: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl SessionTokens {
    /// Expired (with a small clock-skew margin), so the session needs a
    /// refresh before the tokens are usable.
    pub fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(30) >= self.expires_at
    }
}

/// Boundary to the managed identity provider. The access layer treats every
/// operation as opaque and reacts only to success/failure.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, username: &str, password: &str) -> anyhow::Result<()>;
    async fn sign_up(
        &self,
        username: &str,
        password: &str,
        attributes: &[(String, String)],
    ) -> anyhow::Result<()>;
    async fn confirm_sign_up(&self, username: &str, code: &str) -> anyhow::Result<()>;
    async fn sign_out(&self) -> anyhow::Result<()>;
    async fn fetch_session(&self) -> anyhow::Result<Option<SessionTokens>>;
    async fn fetch_user_attributes(&self) -> anyhow::Result<HashMap<String, String>>;
}

/// Resolve a bearer token for outbound API calls. Never errors: any failure
/// to retrieve or refresh a session collapses to `None`, and callers needing
/// auth must fail fast on that instead of sending an unauthenticated request.
pub async fn id_token(provider: &dyn IdentityProvider) -> Option<String> {
    match provider.fetch_session().await {
        Ok(Some(tokens)) => Some(tokens.id_token),
        Ok(None) => None,
        Err(err) => {
            tracing::debug!(error = %err, "session lookup failed; treating as signed out");
            None
        }
    }
}

const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";

/// Cognito user-pool client over its JSON wire protocol, with a file-backed
/// session cache so the CLI keeps its session across invocations.
pub struct CognitoIdentity {
    http: reqwest::Client,
    endpoint: String,
    client_id: String,
    session_file: PathBuf,
}

impl CognitoIdentity {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.idp_endpoint.clone(),
            client_id: config.client_id.clone(),
            session_file: config.session_file.clone(),
        }
    }

    async fn call(
        &self,
        action: &str,
        body: serde_json::Value,
    ) -> anyhow::Result<serde_json::Value> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/x-amz-json-1.1")
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{action}"))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("POST {} ({action})", self.endpoint))?;

        let status = response.status();
        let raw = response.text().await.context("read identity response body")?;
        if !status.is_success() {
            let message = parse_idp_error(&raw).unwrap_or_else(|| raw.clone());
            anyhow::bail!("identity provider error ({status}): {message}");
        }
        if raw.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&raw).context("parse identity response")
    }

    async fn store_auth_result(
        &self,
        result: &serde_json::Value,
        prior_refresh: Option<String>,
    ) -> anyhow::Result<SessionTokens> {
        let auth = result
            .get("AuthenticationResult")
            .ok_or_else(|| anyhow::anyhow!("missing AuthenticationResult in response"))?;

        let id_token = string_field(auth, "IdToken")
            .ok_or_else(|| anyhow::anyhow!("missing IdToken in authentication result"))?;
        let access_token = string_field(auth, "AccessToken")
            .ok_or_else(|| anyhow::anyhow!("missing AccessToken in authentication result"))?;
        // A refresh response omits the refresh token; keep the one we had.
        let refresh_token = string_field(auth, "RefreshToken").or(prior_refresh);
        let expires_in = auth
            .get("ExpiresIn")
            .and_then(|v| v.as_i64())
            .unwrap_or(3600);

        let tokens = SessionTokens {
            id_token,
            access_token,
            refresh_token,
            expires_at: Utc::now() + Duration::seconds(expires_in),
        };
        write_json_atomic(&self.session_file, &tokens)
            .await
            .context("store session tokens")?;
        Ok(tokens)
    }

    async fn refresh(&self, cached: SessionTokens) -> anyhow::Result<Option<SessionTokens>> {
        let Some(refresh_token) = cached.refresh_token.clone() else {
            return Ok(None);
        };
        let body = serde_json::json!({
            "AuthFlow": "REFRESH_TOKEN_AUTH",
            "ClientId": self.client_id,
            "AuthParameters": { "REFRESH_TOKEN": refresh_token },
        });
        let result = self.call("InitiateAuth", body).await?;
        let tokens = self.store_auth_result(&result, Some(refresh_token)).await?;
        Ok(Some(tokens))
    }
}

#[async_trait]
impl IdentityProvider for CognitoIdentity {
    async fn sign_in(&self, username: &str, password: &str) -> anyhow::Result<()> {
        let body = serde_json::json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "ClientId": self.client_id,
            "AuthParameters": { "USERNAME": username, "PASSWORD": password },
        });
        let result = self.call("InitiateAuth", body).await.context("sign in")?;
        self.store_auth_result(&result, None).await?;
        tracing::info!(username, "signed in");
        Ok(())
    }

    async fn sign_up(
        &self,
        username: &str,
        password: &str,
        attributes: &[(String, String)],
    ) -> anyhow::Result<()> {
        let user_attributes: Vec<serde_json::Value> = attributes
            .iter()
            .map(|(name, value)| serde_json::json!({ "Name": name, "Value": value }))
            .collect();
        let body = serde_json::json!({
            "ClientId": self.client_id,
            "Username": username,
            "Password": password,
            "UserAttributes": user_attributes,
        });
        self.call("SignUp", body).await.context("sign up")?;
        Ok(())
    }

    async fn confirm_sign_up(&self, username: &str, code: &str) -> anyhow::Result<()> {
        let body = serde_json::json!({
            "ClientId": self.client_id,
            "Username": username,
            "ConfirmationCode": code,
        });
        self.call("ConfirmSignUp", body)
            .await
            .context("confirm sign up")?;
        Ok(())
    }

    async fn sign_out(&self) -> anyhow::Result<()> {
        let cached: Option<SessionTokens> = read_json(&self.session_file).await.unwrap_or(None);

        // The local session clears regardless of whether the revoke succeeds.
        if let Err(err) = fs::remove_file(&self.session_file).await
            && err.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(
                path = %self.session_file.display(),
                error = %err,
                "failed to remove session file"
            );
        }

        if let Some(tokens) = cached {
            let body = serde_json::json!({ "AccessToken": tokens.access_token });
            self.call("GlobalSignOut", body).await.context("sign out")?;
        }
        Ok(())
    }

    async fn fetch_session(&self) -> anyhow::Result<Option<SessionTokens>> {
        let Some(cached) = read_json::<SessionTokens>(&self.session_file).await? else {
            return Ok(None);
        };
        if !cached.is_expired() {
            return Ok(Some(cached));
        }
        match self.refresh(cached).await {
            Ok(tokens) => Ok(tokens),
            Err(err) => {
                tracing::debug!(error = %err, "session refresh failed");
                Ok(None)
            }
        }
    }

    async fn fetch_user_attributes(&self) -> anyhow::Result<HashMap<String, String>> {
        let tokens = self
            .fetch_session()
            .await?
            .ok_or_else(|| anyhow::anyhow!("no active session"))?;

        let body = serde_json::json!({ "AccessToken": tokens.access_token });
        let result = self.call("GetUser", body).await.context("get user")?;

        let mut attributes = HashMap::new();
        if let Some(items) = result.get("UserAttributes").and_then(|v| v.as_array()) {
            for item in items {
                let (Some(name), Some(value)) = (string_field(item, "Name"), string_field(item, "Value"))
                else {
                    continue;
                };
                attributes.insert(name, value);
            }
        }
        Ok(attributes)
    }
}

fn parse_idp_error(raw: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    let message = value
        .get("message")
        .or_else(|| value.get("Message"))?
        .as_str()?
        .to_owned();
    match value.get("__type").and_then(|v| v.as_str()) {
        Some(kind) => Some(format!("{kind}: {message}")),
        None => Some(message),
    }
}

fn string_field(value: &serde_json::Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| v.as_str()).map(str::to_owned)
}

/// Decode the payload segment of a JWT without verifying the signature. The
/// backend's authorizer verifies; the client only reads advisory claims.
pub fn decode_jwt_payload(token: &str) -> Option<serde_json::Value> {
    let payload = token.split('.').nth(1)?;
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// The subject identifier from an identity token, if decodable.
pub fn subject_claim(id_token: &str) -> Option<String> {
    let payload = decode_jwt_payload(id_token)?;
    string_field(&payload, "sub")
}

/// Whether the identity token carries an "admin" group membership. Advisory
/// only; used for UI gating, never for authorization.
pub fn has_admin_group(id_token: &str) -> bool {
    let Some(payload) = decode_jwt_payload(id_token) else {
        return false;
    };
    payload
        .get("cognito:groups")
        .and_then(|v| v.as_array())
        .is_some_and(|groups| {
            groups
                .iter()
                .any(|g| g.as_str() == Some("admin"))
        })
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<Option<T>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let value = serde_json::from_slice(&bytes).context("parse json")?;
    Ok(Some(value))
}

async fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("path has no parent: {}", path.display()))?;
    fs::create_dir_all(parent)
        .await
        .with_context(|| format!("create parent dir: {}", parent.display()))?;

    let tmp_path = path.with_extension(format!("tmp.{}", uuid::Uuid::new_v4().simple()));
    let data = serde_json::to_vec_pretty(value).context("serialize json")?;
    fs::write(&tmp_path, &data)
        .await
        .with_context(|| format!("write tmp: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("rename tmp to final: {}", path.display()))?;
    Ok(())
}
