//! # Spotify Integration Module
//!
//! HTTP access to the two Spotify services this application talks to:
//!
//! ```text
//! AuthManager / collector
//!          ↓
//! TokenEndpoint + TrackSource traits
//!          ↓
//! SpotifyClient (reqwest)
//!          ↓
//! accounts.spotify.com  /  api.spotify.com
//! ```
//!
//! - [`auth`] - token exchange and refresh against the accounts service,
//!   plus the interactive browser login used by `muralcli auth`.
//! - [`tracks`] - one page of the user's top tracks.
//!
//! The traits are the seams the rest of the crate depends on, so the auth
//! flow and the collector run against fakes in tests.

pub mod auth;
pub mod tracks;

pub use auth::TokenEndpoint;
pub use tracks::TrackSource;

use reqwest::Client;

use crate::config::Settings;

/// reqwest-backed client for the Spotify accounts service and Web API.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    settings: Settings,
}

impl SpotifyClient {
    pub fn new(settings: Settings) -> Self {
        Self {
            http: Client::new(),
            settings,
        }
    }

    /// Use a custom HTTP client, e.g. with timeouts or a proxy.
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
