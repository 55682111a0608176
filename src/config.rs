//! Configuration management for the album mural CLI.
//!
//! Configuration comes from environment variables, optionally seeded from a
//! `.env` file in the local data directory. Values are read once into a
//! [`Settings`] snapshot that is handed to the auth manager and the Spotify
//! client, so nothing below the CLI layer touches the process environment.
//!
//! Precedence:
//! 1. Environment variables
//! 2. `.env` file in the local data directory
//! 3. Defaults for the public Spotify endpoints and the local server

use std::{env, net::SocketAddr, path::PathBuf, str::FromStr};

use chrono::Duration;

pub const DEFAULT_SCOPE: &str = "user-top-read";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 100;
pub const DEFAULT_RATE_LIMIT_WINDOW_MS: i64 = 60_000;

/// Loads environment variables from `<data_local_dir>/muralcli/.env`.
///
/// The parent directory is created if needed. A missing `.env` file is not
/// an error: the process environment is used as is.
///
/// Locations:
/// - Linux: `~/.local/share/muralcli/.env`
/// - macOS: `~/Library/Application Support/muralcli/.env`
/// - Windows: `%LOCALAPPDATA%/muralcli/.env`
///
/// # Errors
///
/// Returns an error string if the directory cannot be created or an existing
/// `.env` file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Platform local data directory for this application.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("muralcli");
    path
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// `SPOTIFY_API_AUTH_CLIENT_ID`, the client ID of the registered Spotify app.
pub fn spotify_client_id() -> Option<String> {
    non_empty_var("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// `SPOTIFY_API_REDIRECT_URI`, which must match the URI registered with Spotify.
pub fn spotify_redirect_uri() -> Option<String> {
    non_empty_var("SPOTIFY_API_REDIRECT_URI")
}

/// `SPOTIFY_API_AUTH_SCOPE`, defaults to the read-only top tracks scope.
pub fn spotify_scope() -> String {
    non_empty_var("SPOTIFY_API_AUTH_SCOPE").unwrap_or_else(|| DEFAULT_SCOPE.to_string())
}

pub fn spotify_apiauth_url() -> String {
    non_empty_var("SPOTIFY_API_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.to_string())
}

pub fn spotify_apitoken_url() -> String {
    non_empty_var("SPOTIFY_API_TOKEN_URL").unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string())
}

pub fn spotify_apiurl() -> String {
    non_empty_var("SPOTIFY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// `SERVER_ADDRESS`, the bind address of the local callback/API server.
pub fn server_addr() -> String {
    non_empty_var("SERVER_ADDRESS").unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string())
}

pub fn rate_limit_max_requests() -> u32 {
    non_empty_var("RATE_LIMIT_MAX_REQUESTS")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_RATE_LIMIT_MAX_REQUESTS)
}

pub fn rate_limit_window_ms() -> i64 {
    non_empty_var("RATE_LIMIT_WINDOW_MS")
        .and_then(|v| v.parse().ok())
        .filter(|ms: &i64| *ms > 0)
        .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_MS)
}

/// Request budget applied per client identity by the rate limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            window: Duration::milliseconds(DEFAULT_RATE_LIMIT_WINDOW_MS),
        }
    }
}

/// Snapshot of every configuration value the application needs.
///
/// The client ID and redirect URI stay optional here; their absence is
/// reported as a configuration error when an auth flow is started, not at
/// load time, so commands that don't need them keep working.
#[derive(Debug, Clone)]
pub struct Settings {
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub server_address: String,
    pub rate_limit: RateLimitPolicy,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            client_id: spotify_client_id(),
            redirect_uri: spotify_redirect_uri(),
            scope: spotify_scope(),
            auth_url: spotify_apiauth_url(),
            token_url: spotify_apitoken_url(),
            api_url: spotify_apiurl(),
            server_address: server_addr(),
            rate_limit: RateLimitPolicy {
                max_requests: rate_limit_max_requests(),
                window: Duration::milliseconds(rate_limit_window_ms()),
            },
        }
    }

    /// Parses the configured server address.
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        SocketAddr::from_str(&self.server_address)
            .map_err(|e| format!("invalid SERVER_ADDRESS '{}': {}", self.server_address, e))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            client_id: None,
            redirect_uri: None,
            scope: DEFAULT_SCOPE.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            rate_limit: RateLimitPolicy::default(),
        }
    }
}
