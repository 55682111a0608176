//! Error types for authentication, validation, storage and collection.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::utils::sanitize_error_message;

/// Failures of the persistence boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Outcomes of the PKCE flow that end an authentication attempt.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Client ID, redirect URI or endpoint URL is missing or unusable.
    #[error("Missing configuration: {0}")]
    Configuration(String),

    /// The user (or the provider) declined the authorization request.
    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("No authorization code received")]
    MissingCode,

    /// No code verifier for this transaction; it expired or was never issued.
    #[error("Missing code verifier")]
    MissingVerifier,

    /// The `state` parameter does not match the one issued at start.
    #[error("State mismatch")]
    StateMismatch,

    #[error("Failed to exchange authorization code: {0}")]
    ExchangeFailed(String),

    #[error("Session store error: {0}")]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Short reason suitable for a redirect query parameter or a terminal.
    pub fn user_message(&self) -> String {
        let message = match self {
            Self::Configuration(_) => "Missing configuration".to_string(),
            Self::AuthorizationDenied(reason) => reason.clone(),
            Self::MissingCode => "No authorization code received".to_string(),
            Self::MissingVerifier => "Missing code verifier".to_string(),
            Self::StateMismatch => "State mismatch, please restart the login".to_string(),
            Self::ExchangeFailed(_) => "Failed to exchange authorization code".to_string(),
            Self::Store(_) => "Authorization failed".to_string(),
        };
        sanitize_error_message(&message)
    }
}

/// Rejections of user-supplied parameters, raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0}")]
    InvalidDimensions(String),

    #[error("Invalid image quality: {0}")]
    InvalidQuality(String),

    #[error("Invalid time range: {0}")]
    InvalidTimeRange(String),

    #[error("{0}")]
    InvalidLimit(String),

    #[error("{0}")]
    InvalidOffset(String),
}

/// Errors raised while fetching top tracks or collecting album covers.
#[derive(Debug, Error)]
pub enum MuralError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unauthorized - please login again")]
    Unauthorized,

    #[error("Rate limit exceeded")]
    RateLimited { retry_after: Option<u64> },

    #[error("Failed to fetch top tracks: {status} {message}")]
    Upstream { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MuralError {
    /// Text shown to the end user. Never contains raw upstream payloads.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => {
                "Your session has expired. Please reconnect your account.".to_string()
            }
            Self::Network(_) => {
                "Network error. Please check your connection and try again.".to_string()
            }
            Self::RateLimited { .. } => {
                "Too many requests. Please wait a moment and try again.".to_string()
            }
            Self::Upstream { status, .. } => {
                sanitize_error_message(&format!("Failed to fetch top tracks, status {status}"))
            }
            Self::Validation(e) => sanitize_error_message(&e.to_string()),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Network(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for MuralError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.user_message() }));
        (self.status_code(), body).into_response()
    }
}
