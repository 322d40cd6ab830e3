//! Signed-in user state: the identity signal the chat widget observes.
//!
//! Tokens and the username live in the key-value store so a session survives
//! restarts. A user is only considered signed in when both the username and
//! an access token are present.

use thiserror::Error;

use crate::api::{ApiClient, TokenPair};
use crate::chat::{ChatBackend, TransportError};
use crate::constants::{ACCESS_TOKEN_KEY, LAYOUT_KEY, REFRESH_TOKEN_KEY, USERNAME_KEY};
use crate::session::IdentityKey;
use crate::storage::{KeyValueStore, StoreError};

#[derive(Debug, Error)]
pub enum AuthError {
    /// Server or transport failure, already formatted for display.
    #[error("{0}")]
    Rejected(String),
    #[error("Login failed: missing token(s) in response.")]
    MissingTokens,
    #[error("could not persist session: {0}")]
    Store(#[from] StoreError),
}

impl From<TransportError> for AuthError {
    fn from(err: TransportError) -> Self {
        AuthError::Rejected(err.details())
    }
}

#[derive(Debug)]
pub struct AuthSession<S> {
    store: S,
    api: ApiClient,
    user: Option<String>,
}

impl<S: KeyValueStore> AuthSession<S> {
    /// Restore a previous session from `store` and arm `api` with its token.
    pub fn restore(store: S, api: ApiClient) -> Self {
        let mut session = Self {
            store,
            api,
            user: None,
        };
        session.reload();
        session
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn identity(&self) -> IdentityKey {
        IdentityKey::from_username(self.user())
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.store.get(ACCESS_TOKEN_KEY).is_some()
    }

    /// Re-read the stored session, picking up logins or logouts made by
    /// another process. Returns whether the identity changed.
    pub fn reload(&mut self) -> bool {
        let before = self.identity();
        let username = self.store.get(USERNAME_KEY).filter(|u| !u.is_empty());
        let access = self.store.get(ACCESS_TOKEN_KEY).filter(|t| !t.is_empty());
        match (username, access) {
            (Some(username), Some(access)) => {
                self.user = Some(username);
                self.api.set_access_token(Some(access));
            }
            _ => {
                self.user = None;
                self.api.set_access_token(None);
            }
        }
        before != self.identity()
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), AuthError> {
        let response = self.api.login(username, password).await;
        self.complete_login(username, response)
    }

    /// Apply the server's answer to a login request made with [`ApiClient::login`].
    pub fn complete_login(
        &mut self,
        username: &str,
        response: Result<TokenPair, TransportError>,
    ) -> Result<(), AuthError> {
        let result = self.store_tokens(username, response);
        if let Err(err) = &result {
            tracing::warn!(%err, username, "login failed");
            // No stale credentials may survive a failed attempt.
            self.clear_credentials();
        }
        result
    }

    fn store_tokens(
        &mut self,
        username: &str,
        response: Result<TokenPair, TransportError>,
    ) -> Result<(), AuthError> {
        let tokens = response?;
        let (Some(access), Some(refresh)) = (
            tokens.access.filter(|t| !t.is_empty()),
            tokens.refresh.filter(|t| !t.is_empty()),
        ) else {
            return Err(AuthError::MissingTokens);
        };
        self.store.set(ACCESS_TOKEN_KEY, &access)?;
        self.store.set(REFRESH_TOKEN_KEY, &refresh)?;
        self.store.set(USERNAME_KEY, username)?;
        self.api.set_access_token(Some(access));
        self.user = Some(username.to_string());
        tracing::info!(username, "signed in");
        Ok(())
    }

    /// Create the account, then sign in with it.
    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        self.api.register(username, email, password).await?;
        self.login(username, password).await
    }

    /// Forget the session locally (tokens, username, widget layout), then ask
    /// the server to drop the assistant conversation. The remote call is best
    /// effort and cannot fail the logout.
    pub async fn logout(&mut self) {
        self.sign_out();
        self.api.reset().await.ignore();
    }

    /// The local half of [`Self::logout`]; the caller owns the remote reset.
    pub fn sign_out(&mut self) {
        self.clear_credentials();
        if let Err(err) = self.store.remove(LAYOUT_KEY) {
            tracing::debug!(%err, "failed to clear widget layout on logout");
        }
        tracing::info!("signed out");
    }

    fn clear_credentials(&mut self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USERNAME_KEY] {
            if let Err(err) = self.store.remove(key) {
                tracing::debug!(%err, key, "failed to clear stored credential");
            }
        }
        self.user = None;
        self.api.set_access_token(None);
    }
}
