use std::sync::Arc;

use reqwest::Client;

use crate::{
    completion::CompletionClient,
    config::Config,
    error::{Error, Result},
    spotify::{AuthClient, TopClient},
};

/// Everything a request handler needs, built once at startup.
///
/// All fields are read-only; the clients share one connection pool.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: AuthClient,
    pub top: TopClient,
    pub completion: CompletionClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(AppState {
            auth: AuthClient::new(http.clone(), &config),
            top: TopClient::new(http.clone(), &config),
            completion: CompletionClient::new(http, &config)?,
            config: Arc::new(config),
        })
    }
}
