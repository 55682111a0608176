//! muralcli library
//!
//! Connects a Spotify account through the OAuth 2.0 Authorization Code flow
//! with PKCE and collects distinct album covers from the user's top tracks
//! to fill a `width` x `height` mural.
//!
//! # Modules
//!
//! - `api` - HTTP handlers of the local server
//! - `cli` - command implementations used by the binary
//! - `config` - environment configuration
//! - `error` - error types and their user-facing messages
//! - `management` - auth session, session store, rate limiter and the
//!   album cover collector
//! - `server` - router and listener setup
//! - `spotify` - reqwest client for the accounts service and Web API
//! - `types` - wire and domain types
//! - `utils` - PKCE helpers and error message sanitizing
//! - `validation` - bounds for user supplied parameters
//!
//! # Example
//!
//! ```no_run
//! use muralcli::{
//!     config::{self, Settings},
//!     management::{AuthManager, FileStore},
//!     spotify::SpotifyClient,
//! };
//!
//! #[tokio::main]
//! async fn main() -> muralcli::Res<()> {
//!     config::load_env().await?;
//!     let settings = Settings::from_env();
//!     let client = SpotifyClient::new(settings.clone());
//!     let auth = AuthManager::new(settings, FileStore::new(FileStore::default_path()), client);
//!     println!("authenticated: {}", auth.check_status().await);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;
pub mod validation;

/// Boxed error result used at the edges of the application.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Accepts the same arguments as `println!`.
///
/// ```ignore
/// info!("Collecting {} album covers", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits with
/// status 1.
///
/// Only meant for the binary and `cli` commands; library code returns
/// errors instead.
///
/// ```ignore
/// error!("Invalid server address: {}", e);
/// // not reached
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning with a yellow exclamation mark. Used for recoverable
/// problems such as a failed callback or a short mural.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
