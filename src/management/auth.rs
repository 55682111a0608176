use chrono::{Duration, Utc};
use url::Url;

use crate::{
    config::Settings,
    error::AuthError,
    management::SessionStore,
    spotify::TokenEndpoint,
    types::{AuthorizationRequest, CallbackParams, Token},
    utils, warning,
};

pub const ACCESS_TOKEN_KEY: &str = "spotify_access_token";
pub const REFRESH_TOKEN_KEY: &str = "spotify_refresh_token";
pub const TOKEN_EXPIRES_KEY: &str = "spotify_token_expires";
pub const CODE_VERIFIER_KEY: &str = "code_verifier";
pub const STATE_KEY: &str = "oauth_state";

/// Lifetime of an authorization transaction (verifier and state).
pub const TRANSACTION_TTL_SECS: i64 = 600;
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 365;

/// Drives the PKCE authorization flow and the token lifecycle.
///
/// All state lives in the [`SessionStore`]; the manager itself holds only
/// configuration, so it can be shared behind an `Arc` by the callback
/// server and the CLI at the same time.
pub struct AuthManager<S, E> {
    settings: Settings,
    store: S,
    endpoint: E,
}

impl<S, E> AuthManager<S, E>
where
    S: SessionStore,
    E: TokenEndpoint,
{
    pub fn new(settings: Settings, store: S, endpoint: E) -> Self {
        Self {
            settings,
            store,
            endpoint,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// Begins a new authorization transaction and returns the URL to visit.
    ///
    /// A fresh 128 character verifier and a state value are stored for ten
    /// minutes; only their derived challenge and the state leave this call.
    ///
    /// # Errors
    ///
    /// [`AuthError::Configuration`] when the client ID or redirect URI is
    /// unset, before anything is stored or sent.
    pub async fn start(&self) -> Result<AuthorizationRequest, AuthError> {
        let client_id = self.settings.client_id.as_deref().ok_or_else(|| {
            AuthError::Configuration("SPOTIFY_API_AUTH_CLIENT_ID is not set".into())
        })?;
        let redirect_uri = self.settings.redirect_uri.as_deref().ok_or_else(|| {
            AuthError::Configuration("SPOTIFY_API_REDIRECT_URI is not set".into())
        })?;
        let mut url = Url::parse(&self.settings.auth_url).map_err(|e| {
            AuthError::Configuration(format!("invalid authorization URL: {e}"))
        })?;

        let code_verifier = utils::generate_code_verifier();
        let code_challenge = utils::generate_code_challenge(&code_verifier);
        let state = utils::generate_state();

        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", client_id)
            .append_pair("scope", &self.settings.scope)
            .append_pair("code_challenge_method", "S256")
            .append_pair("code_challenge", &code_challenge)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("state", &state);

        let ttl = Some(Duration::seconds(TRANSACTION_TTL_SECS));
        self.store.set(CODE_VERIFIER_KEY, &code_verifier, ttl).await?;
        self.store.set(STATE_KEY, &state, ttl).await?;

        Ok(AuthorizationRequest { url: url.into() })
    }

    /// Completes the transaction from the provider's redirect.
    ///
    /// Checks run in order: provider error, code present, state matches the
    /// stored one, verifier present. Any failure ends the transaction before
    /// a token request is made. On success the tokens are persisted and the
    /// verifier is gone.
    pub async fn handle_callback(&self, params: &CallbackParams) -> Result<(), AuthError> {
        if let Some(error) = &params.error {
            self.cancel_transaction().await;
            return Err(AuthError::AuthorizationDenied(error.clone()));
        }

        let Some(code) = params.code.as_deref().filter(|code| !code.is_empty()) else {
            self.cancel_transaction().await;
            return Err(AuthError::MissingCode);
        };

        let stored_state = self.store.get(STATE_KEY).await?;
        let state_matches = match (params.state.as_deref(), stored_state.as_deref()) {
            (Some(received), Some(stored)) => utils::constant_time_eq(received, stored),
            _ => false,
        };
        if !state_matches {
            warning!("OAuth state mismatch, aborting authorization");
            self.cancel_transaction().await;
            return Err(AuthError::StateMismatch);
        }

        let Some(code_verifier) = self.store.get(CODE_VERIFIER_KEY).await? else {
            self.cancel_transaction().await;
            return Err(AuthError::MissingVerifier);
        };

        // the verifier is single use whatever the exchange outcome
        self.cancel_transaction().await;

        let token = self
            .endpoint
            .exchange_code(code, &code_verifier)
            .await
            .inspect_err(|e| warning!("Token exchange failed: {}", e))?;

        self.persist_token(&token).await
    }

    /// Reports whether a usable access token is stored, refreshing it first
    /// when it has expired. Any failure reads as unauthenticated.
    pub async fn check_status(&self) -> bool {
        let access_token = self.store.get(ACCESS_TOKEN_KEY).await;
        let expires = self.store.get(TOKEN_EXPIRES_KEY).await;

        let (Ok(Some(_)), Ok(Some(expires))) = (access_token, expires) else {
            return false;
        };

        let Ok(expires_at) = expires.parse::<i64>() else {
            warning!("Stored token expiry is unreadable, clearing session");
            self.clear_tokens().await;
            return false;
        };

        if Utc::now().timestamp_millis() < expires_at {
            return true;
        }

        self.refresh().await.is_ok()
    }

    /// Exchanges the stored refresh token for a new access token.
    ///
    /// The refresh token is only replaced when the provider rotates it. On
    /// failure every token is cleared.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let refresh_token = match self.store.get(REFRESH_TOKEN_KEY).await {
            Ok(Some(token)) => token,
            Ok(None) => {
                self.clear_tokens().await;
                return Err(AuthError::ExchangeFailed("no refresh token stored".into()));
            }
            Err(e) => {
                self.clear_tokens().await;
                return Err(e.into());
            }
        };

        match self.endpoint.refresh_token(&refresh_token).await {
            Ok(token) => self.persist_token(&token).await,
            Err(e) => {
                warning!("Token refresh failed: {}", e);
                self.clear_tokens().await;
                Err(e)
            }
        }
    }

    /// Access token for a data call, after [`Self::check_status`] has passed.
    pub async fn valid_access_token(&self) -> Option<String> {
        if !self.check_status().await {
            return None;
        }
        self.store.get(ACCESS_TOKEN_KEY).await.ok().flatten()
    }

    /// True while a started transaction awaits its callback.
    pub async fn transaction_pending(&self) -> bool {
        matches!(self.store.get(CODE_VERIFIER_KEY).await, Ok(Some(_)))
    }

    /// Drops the verifier and state of the current transaction, if any.
    pub async fn cancel_transaction(&self) {
        self.delete_all(&[CODE_VERIFIER_KEY, STATE_KEY]).await;
    }

    /// Removes every persisted session value. Never fails.
    pub async fn logout(&self) {
        self.delete_all(&[
            ACCESS_TOKEN_KEY,
            REFRESH_TOKEN_KEY,
            TOKEN_EXPIRES_KEY,
            CODE_VERIFIER_KEY,
            STATE_KEY,
        ])
        .await;
    }

    async fn clear_tokens(&self) {
        self.delete_all(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TOKEN_EXPIRES_KEY])
            .await;
    }

    async fn delete_all(&self, keys: &[&str]) {
        for key in keys {
            if let Err(e) = self.store.delete(key).await {
                warning!("Failed to delete {} from session store: {}", key, e);
            }
        }
    }

    /// Stores the access token and its absolute expiry, plus the refresh
    /// token when one is present.
    ///
    /// Everything is kept as long as the refresh token so that an expired
    /// access token can still be refreshed.
    async fn persist_token(&self, token: &Token) -> Result<(), AuthError> {
        let expires_at = i64::try_from(token.expires_in)
            .ok()
            .and_then(|secs| secs.checked_mul(1000))
            .and_then(|ms| Utc::now().timestamp_millis().checked_add(ms))
            .ok_or_else(|| {
                AuthError::ExchangeFailed(format!("invalid expires_in: {}", token.expires_in))
            })?;
        let ttl = Some(Duration::days(REFRESH_TOKEN_TTL_DAYS));

        self.store
            .set(ACCESS_TOKEN_KEY, &token.access_token, ttl)
            .await?;
        self.store
            .set(TOKEN_EXPIRES_KEY, &expires_at.to_string(), ttl)
            .await?;
        if let Some(refresh_token) = &token.refresh_token {
            self.store.set(REFRESH_TOKEN_KEY, refresh_token, ttl).await?;
        }

        Ok(())
    }
}
