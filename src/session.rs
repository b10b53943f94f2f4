use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;

use crate::identity::{self, IdentityProvider};
use crate::model::{Role, User};

/// Process-wide auth lifecycle. `Loading` covers startup and every
/// login/logout/hydration transition in flight.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthState {
    #[default]
    Loading,
    Authenticated(User),
    Unauthenticated,
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// The one shared mutable resource in the client: current identity, read by
/// many views, mutated only through the transitions below. Consumers observe
/// it via [`AuthSession::subscribe`] or [`AuthSession::current`].
pub struct AuthSession {
    provider: Arc<dyn IdentityProvider>,
    state: watch::Sender<AuthState>,
}

impl AuthSession {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (state, _) = watch::channel(AuthState::Loading);
        Self { provider, state }
    }

    pub fn current(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Rebuild the session identity from provider attributes and token
    /// claims. Every failure is absorbed into `Unauthenticated`; hydration
    /// never surfaces an error to the caller.
    pub async fn hydrate(&self) {
        self.state.send_replace(AuthState::Loading);
        match self.build_user().await {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, role = ?user.role, "session hydrated");
                self.state.send_replace(AuthState::Authenticated(user));
            }
            Err(err) => {
                tracing::debug!(error = %err, "session hydration failed");
                self.state.send_replace(AuthState::Unauthenticated);
            }
        }
    }

    /// Credential login. A sign-in failure propagates to the caller, but the
    /// store never stays in `Loading`.
    pub async fn login(&self, email: &str, password: &str) -> anyhow::Result<()> {
        self.state.send_replace(AuthState::Loading);
        if let Err(err) = self.provider.sign_in(email, password).await {
            self.state.send_replace(AuthState::Unauthenticated);
            return Err(err);
        }
        self.hydrate().await;
        Ok(())
    }

    /// Optimistic logout: local state clears first, then the remote revoke
    /// is attempted; a failed revoke is logged and swallowed.
    pub async fn logout(&self) {
        self.state.send_replace(AuthState::Unauthenticated);
        if let Err(err) = self.provider.sign_out().await {
            tracing::warn!(error = %err, "sign out revoke failed; local session cleared anyway");
        }
    }

    /// Registration. No state transition; the account still needs
    /// confirmation before it can sign in.
    pub async fn signup(&self, email: &str, password: &str, name: &str) -> anyhow::Result<()> {
        let parts: Vec<&str> = name.split_whitespace().collect();
        let given_name = parts.first().copied().unwrap_or(name).to_owned();
        let family_name = if parts.len() > 1 {
            parts[1..].join(" ")
        } else {
            given_name.clone()
        };

        let attributes = vec![
            ("email".to_owned(), email.to_owned()),
            ("name".to_owned(), name.to_owned()),
            ("given_name".to_owned(), given_name),
            ("family_name".to_owned(), family_name),
        ];
        self.provider.sign_up(email, password, &attributes).await
    }

    pub async fn confirm(&self, email: &str, code: &str) -> anyhow::Result<()> {
        self.provider.confirm_sign_up(email, code).await
    }

    async fn build_user(&self) -> anyhow::Result<User> {
        let attributes = self.provider.fetch_user_attributes().await?;
        let tokens = self.provider.fetch_session().await.ok().flatten();

        // Identity derivation order: attribute `sub` first, then the claim
        // decoded from the current id token.
        let id = attributes
            .get("sub")
            .filter(|sub| !sub.is_empty())
            .cloned()
            .or_else(|| {
                tokens
                    .as_ref()
                    .and_then(|t| identity::subject_claim(&t.id_token))
            })
            .unwrap_or_default();

        let role = match tokens.as_ref() {
            Some(t) if identity::has_admin_group(&t.id_token) => Role::Admin,
            _ => Role::User,
        };

        Ok(User {
            id,
            email: attributes.get("email").cloned().unwrap_or_default(),
            name: attributes.get("name").cloned().unwrap_or_default(),
            role,
            created_at: Utc::now(),
        })
    }
}
