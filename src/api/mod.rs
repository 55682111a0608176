//! # API Module
//!
//! HTTP endpoints served by the local server.
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - `POST /api/auth/start` ([`start`]) - begins a PKCE transaction and
//!   returns the Spotify authorization URL.
//! - `GET /callback` ([`callback`]) - Spotify's redirect target; completes
//!   the transaction and redirects to `/`.
//! - `GET /api/auth/status` ([`status`]) - whether a usable token exists,
//!   refreshing an expired one.
//! - `POST /api/auth/logout` ([`logout`]) - clears the session.
//!
//! ### Data
//!
//! - `GET /api/spotify/top-tracks` ([`top_tracks`]) - one rate limited,
//!   validated page of the user's top tracks.
//! - `GET /api/mural` ([`mural`]) - the deduplicated album covers for a
//!   `width` x `height` mural.
//!
//! ### Misc
//!
//! - `GET /` ([`index`]) - landing page showing the outcome of a login.
//! - `GET /health` ([`health`]) - status and version.
//!
//! Error bodies are `{"error": "..."}` with text that has been through
//! [`crate::utils::sanitize_error_message`].

mod auth;
mod callback;
mod health;
mod tracks;

pub use auth::{logout, start, status};
pub use callback::{callback, index};
pub use health::health;
pub use tracks::{client_identity, mural, top_tracks};
