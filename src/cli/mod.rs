//! # CLI Module
//!
//! User-facing commands of muralcli. Each command takes the shared
//! [`CliState`] built in `main` and reports through the colored output
//! macros (`info!`, `success!`, `warning!`, `error!`).
//!
//! ## Commands
//!
//! - [`auth`] - interactive PKCE login through the browser
//! - [`status`] - whether a usable access token is stored
//! - [`logout`] - forget all tokens and pending transactions
//! - [`mural`] - collect album covers for a `width` x `height` mural and
//!   print them as a table or JSON
//! - [`serve`] - run the HTTP API until interrupted
//!
//! ## Usage
//!
//! ```bash
//! muralcli auth
//! muralcli mural --width 4 --height 3 --quality high
//! muralcli mural --width 2 --height 2 --time-range short_term --json
//! muralcli serve
//! ```

mod auth;
mod mural;
mod serve;

pub use auth::{auth, logout, status};
pub use mural::mural;
pub use serve::serve;

use crate::{
    management::{FileStore, InMemoryRateLimiter},
    server::AppState,
    spotify::SpotifyClient,
};

/// Application state used by the binary.
pub type CliState = AppState<FileStore, SpotifyClient, InMemoryRateLimiter>;
