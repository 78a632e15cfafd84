//! Sporacle backend library
//!
//! A relay between Spotify and a hosted language model. A listener signs in
//! with Spotify's authorization-code flow, the relay fetches their top tracks
//! and artists with the token they hold, and forwards the names into an
//! oracle-style prompt whose generated text is returned verbatim.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints
//! - `backoff` - exponential backoff executor for rate-limited calls
//! - `completion` - prompt template and text-generation client
//! - `config` - configuration loading and the `Config` struct
//! - `error` - error taxonomy and its HTTP mapping
//! - `server` - router assembly and listener
//! - `spotify` - OAuth exchange and top-items clients
//! - `state` - shared per-process handler state
//! - `types` - data structures exchanged with clients and providers
//! - `utils` - state tokens and cookie helpers
//!
//! # Example
//!
//! ```
//! use sporacle::{config, server};
//!
//! #[tokio::main]
//! async fn main() -> sporacle::Result<()> {
//!     config::load_env().await.ok();
//!     let config = config::load().await?;
//!     server::start_api_server(config, false).await
//! }
//! ```

pub mod api;
pub mod backoff;
pub mod completion;
pub mod config;
pub mod error;
pub mod server;
pub mod spotify;
pub mod state;
pub mod types;
pub mod utils;

pub use error::{Error, Result};

/// Prints an informational message with a blue bullet point.
///
/// Creates a formatted output line with a distinctive blue "o" indicator
/// followed by the provided message.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// info!("User logged in: {}", profile.id);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// Creates a formatted output line with a green "✓" indicator.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// success!("Listening on {}", port);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Creates a formatted error output with a red "!" indicator and immediately
/// terminates the program with exit code 1. Only startup code uses it;
/// request handlers report failures as responses instead.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Behavior
///
/// The process exits right after printing the message.
///
/// # Example
///
/// ```
/// error!("Cannot load configuration. Err: {}", e);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Creates a formatted output line with a yellow "!" indicator. Used for
/// failures the service recovers from, such as a rejected callback or an
/// upstream error turned into a 500. Never pass tokens or upstream bodies.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// warning!("Rate limit hit. Retrying in {} ms...", delay);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
