use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
};
use serde::Deserialize;
use url::form_urlencoded;

use crate::{
    management::{RateLimiter, SessionStore},
    server::{AppState, LoginOutcome},
    spotify::{TokenEndpoint, TrackSource},
    success,
    types::CallbackParams,
    utils::sanitize_error_message,
    warning,
};

/// Spotify redirects here after the consent screen. Never renders the
/// provider's answer directly: the browser is sent back to `/` with either
/// `authorized=true` or a sanitized `error`.
pub async fn callback<S, C, L>(
    State(state): State<AppState<S, C, L>>,
    Query(params): Query<CallbackParams>,
) -> Redirect
where
    S: SessionStore,
    C: TokenEndpoint + TrackSource,
    L: RateLimiter,
{
    match state.auth.handle_callback(&params).await {
        Ok(()) => {
            success!("Authorization completed.");
            state.publish_login(LoginOutcome::Authorized);
            Redirect::to("/?authorized=true")
        }
        Err(e) => {
            warning!("Authorization callback failed: {}", e);
            let reason = e.user_message();
            let message: String = form_urlencoded::byte_serialize(reason.as_bytes()).collect();
            state.publish_login(LoginOutcome::Failed(reason));
            Redirect::to(&format!("/?error={}", message))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct IndexParams {
    authorized: Option<String>,
    error: Option<String>,
}

pub async fn index(Query(params): Query<IndexParams>) -> Html<String> {
    if let Some(error) = params.error {
        // Anyone can link to /?error=..., so the text is filtered again here.
        return Html(format!(
            "<h4>Login failed.</h4><p>{}</p>",
            sanitize_error_message(&error)
        ));
    }

    if params.authorized.as_deref() == Some("true") {
        return Html(
            "<h2>Authentication successful.</h2><p>Close this browser window.</p>".to_string(),
        );
    }

    Html("<h2>muralcli</h2><p>Run <code>muralcli auth</code> to connect your Spotify account.</p>".to_string())
}
