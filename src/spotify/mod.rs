//! # Spotify Integration Module
//!
//! Clients for the two Spotify services the relay talks to:
//!
//! - [`auth`] - the accounts service: authorize URL, authorization-code and
//!   refresh-token exchanges (HTTP Basic auth with the client credentials),
//!   and the profile lookup used to log who signed in
//! - [`top`] - the Web API's top-items endpoint for tracks and artists
//!
//! Both clients share the process-wide `reqwest::Client` and take their
//! endpoints from [`crate::config::Config`], so tests can point them at a
//! local fake.
//!
//! Neither client retries. Rate limiting is only handled for the completion
//! call, see [`crate::backoff`].

pub mod auth;
pub mod top;

pub use auth::AuthClient;
pub use top::{TopClient, TopQuery};
