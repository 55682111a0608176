use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::{net::TcpListener, sync::watch};

use crate::{
    api,
    config::RateLimitPolicy,
    info,
    management::{AuthManager, RateLimiter, SessionStore},
    spotify::{TokenEndpoint, TrackSource},
};

/// Result of the most recent `/callback`, published once the callback has
/// finished, tokens included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Pending,
    Authorized,
    Failed(String),
}

/// Shared state of the HTTP boundary.
pub struct AppState<S, C, L> {
    pub auth: Arc<AuthManager<S, C>>,
    pub limiter: Arc<L>,
    pub rate_limit: RateLimitPolicy,
    login: Arc<watch::Sender<LoginOutcome>>,
}

impl<S, C, L> AppState<S, C, L> {
    pub fn new(auth: AuthManager<S, C>, limiter: L, rate_limit: RateLimitPolicy) -> Self {
        let (login, _) = watch::channel(LoginOutcome::Pending);
        Self {
            auth: Arc::new(auth),
            limiter: Arc::new(limiter),
            rate_limit,
            login: Arc::new(login),
        }
    }

    /// Receiver that sees every outcome published after this call.
    pub fn subscribe_login(&self) -> watch::Receiver<LoginOutcome> {
        self.login.subscribe()
    }

    pub fn publish_login(&self, outcome: LoginOutcome) {
        self.login.send_replace(outcome);
    }
}

impl<S, C, L> Clone for AppState<S, C, L> {
    fn clone(&self) -> Self {
        Self {
            auth: Arc::clone(&self.auth),
            limiter: Arc::clone(&self.limiter),
            rate_limit: self.rate_limit,
            login: Arc::clone(&self.login),
        }
    }
}

pub fn router<S, C, L>(state: AppState<S, C, L>) -> Router
where
    S: SessionStore,
    C: TokenEndpoint + TrackSource,
    L: RateLimiter,
{
    Router::new()
        .route("/", get(api::index))
        .route("/health", get(api::health))
        .route("/callback", get(api::callback::<S, C, L>))
        .route("/api/auth/start", post(api::start::<S, C, L>))
        .route("/api/auth/status", get(api::status::<S, C, L>))
        .route("/api/auth/logout", post(api::logout::<S, C, L>))
        .route("/api/spotify/top-tracks", get(api::top_tracks::<S, C, L>))
        .route("/api/mural", get(api::mural::<S, C, L>))
        .with_state(state)
}

/// Serves the router on an already bound listener.
pub async fn serve<S, C, L>(listener: TcpListener, state: AppState<S, C, L>) -> std::io::Result<()>
where
    S: SessionStore,
    C: TokenEndpoint + TrackSource,
    L: RateLimiter,
{
    axum::serve(listener, router(state)).await
}

pub async fn start_api_server<S, C, L>(
    state: AppState<S, C, L>,
    addr: SocketAddr,
) -> std::io::Result<()>
where
    S: SessionStore,
    C: TokenEndpoint + TrackSource,
    L: RateLimiter,
{
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    serve(listener, state).await
}
