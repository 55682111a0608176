use std::{future::Future, net::SocketAddr, time::Duration};

use reqwest::Response;
use tokio::{net::TcpListener, sync::watch};

use crate::{
    error::AuthError,
    management::{RateLimiter, SessionStore},
    server::{self, AppState, LoginOutcome},
    spotify::{SpotifyClient, TrackSource},
    types::Token,
    warning,
};

/// The provider's token endpoint.
///
/// Both grants fail with [`AuthError::ExchangeFailed`] on a network error or
/// a non-2xx response, and with [`AuthError::Configuration`] when the client
/// ID or redirect URI is not configured.
pub trait TokenEndpoint: Send + Sync + 'static {
    /// `grant_type=authorization_code` with the PKCE verifier.
    fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> impl Future<Output = Result<Token, AuthError>> + Send;

    /// `grant_type=refresh_token`. The response may carry a rotated refresh token.
    fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<Token, AuthError>> + Send;
}

impl SpotifyClient {
    fn client_id(&self) -> Result<&str, AuthError> {
        self.settings
            .client_id
            .as_deref()
            .ok_or_else(|| AuthError::Configuration("SPOTIFY_API_AUTH_CLIENT_ID is not set".into()))
    }

    fn redirect_uri(&self) -> Result<&str, AuthError> {
        self.settings
            .redirect_uri
            .as_deref()
            .ok_or_else(|| AuthError::Configuration("SPOTIFY_API_REDIRECT_URI is not set".into()))
    }
}

impl TokenEndpoint for SpotifyClient {
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<Token, AuthError> {
        let client_id = self.client_id()?;
        let redirect_uri = self.redirect_uri()?;

        let res = self
            .http
            .post(&self.settings.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", client_id),
                ("code", code),
                ("code_verifier", code_verifier),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| AuthError::ExchangeFailed(e.to_string()))?;

        parse_token_response(res).await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<Token, AuthError> {
        let client_id = self.client_id()?;

        let res = self
            .http
            .post(&self.settings.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", client_id),
            ])
            .send()
            .await
            .map_err(|e| AuthError::ExchangeFailed(e.to_string()))?;

        parse_token_response(res).await
    }
}

async fn parse_token_response(res: Response) -> Result<Token, AuthError> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(AuthError::ExchangeFailed(format!("{status}: {body}")));
    }

    res.json::<Token>()
        .await
        .map_err(|e| AuthError::ExchangeFailed(e.to_string()))
}

/// How long `muralcli auth` waits for the browser to come back.
pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(60);

/// Runs the interactive PKCE login for `muralcli auth`.
///
/// 1. Starts the transaction (verifier, challenge and state are stored).
/// 2. Serves the callback route on `addr`.
/// 3. Opens the authorization URL in the default browser.
/// 4. Waits up to [`LOGIN_TIMEOUT`] for the callback to report its outcome.
///
/// # Errors
///
/// Returns the user-facing reason when configuration is missing, the
/// server cannot bind, or the flow fails or times out.
pub async fn auth<S, C, L>(state: AppState<S, C, L>, addr: SocketAddr) -> Result<(), String>
where
    S: SessionStore,
    C: TokenEndpoint + TrackSource,
    L: RateLimiter,
{
    let request = state.auth.start().await.map_err(|e| e.to_string())?;
    state.publish_login(LoginOutcome::Pending);
    let login = state.subscribe_login();

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind callback server on {addr}: {e}"))?;
    let server_state = state.clone();
    let server = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, server_state).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    if webbrowser::open(&request.url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            request.url
        )
    }

    let result = wait_for_callback(login, LOGIN_TIMEOUT).await;
    if result.is_err() {
        state.auth.cancel_transaction().await;
    }

    // let the browser load the page the callback redirected to
    tokio::time::sleep(Duration::from_secs(1)).await;
    server.abort();

    result
}

/// Waits until the callback publishes an outcome other than
/// [`LoginOutcome::Pending`]. The callback publishes only after the code
/// exchange and token storage have finished.
///
/// # Errors
///
/// The sanitized reason when the callback failed, or a timeout message.
pub async fn wait_for_callback(
    mut login: watch::Receiver<LoginOutcome>,
    timeout: Duration,
) -> Result<(), String> {
    let outcome = tokio::time::timeout(timeout, async {
        login
            .wait_for(|outcome| *outcome != LoginOutcome::Pending)
            .await
            .map(|outcome| outcome.clone())
    })
    .await;

    match outcome {
        Ok(Ok(LoginOutcome::Authorized)) => Ok(()),
        Ok(Ok(LoginOutcome::Failed(reason))) => Err(format!("Authentication failed: {reason}")),
        Ok(Ok(LoginOutcome::Pending)) | Ok(Err(_)) => {
            Err("Authentication failed: callback server stopped.".to_string())
        }
        Err(_) => Err("Authentication timed out.".to_string()),
    }
}
