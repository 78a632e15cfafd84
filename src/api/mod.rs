//! # API Module
//!
//! HTTP endpoints of the sporacle relay.
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`login`] - `GET /login`, sets the state cookie and redirects to Spotify
//! - [`callback`] - `GET /callback`, checks the state and exchanges the code;
//!   the browser ends up on `/#access_token=..&refresh_token=..` or
//!   `/#error=state_mismatch` / `/#error=invalid_token`
//! - [`refresh_token`] - `GET /refresh_token`, trades a refresh token for a
//!   new access token
//!
//! ### Data
//!
//! - [`top_tracks_and_artists`] - `GET /api/top-tracks-and-artists`
//! - [`generate_response`] - `POST /generate-response`
//!
//! ### Monitoring
//!
//! - [`root`] - `GET /`, plain-text liveness probe
//! - [`health`] - `GET /health`, status and version as JSON
//! - [`not_found`] - fallback, `404 {"error": "Endpoint not found"}`
//!
//! ## Error Responses
//!
//! JSON endpoints answer failures with `{"error": "..."}`. Validation
//! problems are reported as 400 before any upstream call is made; upstream
//! failures are logged and reduced to a generic 500 message.

mod auth;
mod generate;
mod health;
mod top;

pub use auth::{callback, login, refresh_token};
pub use generate::generate_response;
pub use health::{health, not_found, root};
pub use top::top_tracks_and_artists;
