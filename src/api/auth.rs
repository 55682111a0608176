use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use crate::{
    management::{RateLimiter, SessionStore},
    server::AppState,
    spotify::{TokenEndpoint, TrackSource},
    warning,
};

pub async fn start<S, C, L>(State(state): State<AppState<S, C, L>>) -> Response
where
    S: SessionStore,
    C: TokenEndpoint + TrackSource,
    L: RateLimiter,
{
    match state.auth.start().await {
        Ok(request) => Json(request).into_response(),
        Err(e) => {
            warning!("Failed to start authorization: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.user_message() })),
            )
                .into_response()
        }
    }
}

pub async fn status<S, C, L>(State(state): State<AppState<S, C, L>>) -> (StatusCode, Json<Value>)
where
    S: SessionStore,
    C: TokenEndpoint + TrackSource,
    L: RateLimiter,
{
    if state.auth.check_status().await {
        (StatusCode::OK, Json(json!({ "authenticated": true })))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "authenticated": false })),
        )
    }
}

pub async fn logout<S, C, L>(State(state): State<AppState<S, C, L>>) -> Json<Value>
where
    S: SessionStore,
    C: TokenEndpoint + TrackSource,
    L: RateLimiter,
{
    state.auth.logout().await;
    Json(json!({ "success": true }))
}
