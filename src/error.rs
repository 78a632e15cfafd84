//! Error taxonomy for the relay.
//!
//! Every failure the service can produce is one of the variants of [`Error`].
//! Validation failures are raised before any network call; everything that
//! originates upstream is reduced to a generic message when it crosses the
//! route boundary, so provider payloads never reach the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::backoff::BackoffError;

/// Standard result type for sporacle operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed request input. The client's fault.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The OAuth `state` parameter did not match the stored cookie.
    #[error("state mismatch")]
    StateMismatch,

    /// Token or profile call against the provider's accounts service failed.
    #[error("token exchange failed: {0}")]
    AuthExchange(String),

    /// Top-entities call failed, expired tokens included.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The remote answered with HTTP 429. Retried by the backoff executor.
    #[error("rate limited by upstream")]
    RateLimited,

    #[error("exceeded maximum retries after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    /// Any other non-retryable failure of an external API.
    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status this error resolves to at a route boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message that is safe to hand to the client.
    ///
    /// Only validation messages are written by this crate from request
    /// input; all other variants collapse into a fixed sentence.
    pub fn public_message(&self) -> String {
        match self {
            Error::Validation(msg) => msg.clone(),
            Error::StateMismatch => "State mismatch".to_string(),
            Error::AuthExchange(_) => "Failed to obtain token from provider".to_string(),
            Error::Fetch(_) => "Failed to fetch top tracks or top artists".to_string(),
            Error::RateLimited | Error::RetriesExhausted { .. } | Error::Upstream(_) => {
                "Failed to generate response. Please try again.".to_string()
            }
            Error::Config(_) | Error::Io(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(json!({ "error": self.public_message() })),
        )
            .into_response()
    }
}

impl From<BackoffError<Error>> for Error {
    fn from(e: BackoffError<Error>) -> Self {
        match e {
            BackoffError::Exhausted { attempts } => Error::RetriesExhausted { attempts },
            BackoffError::Aborted(inner) => inner,
        }
    }
}
