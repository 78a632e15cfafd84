use reqwest::{Client, Response};
use url::Url;

use crate::{
    config::{Config, SCOPE},
    error::{Error, Result},
    types::{TokenPair, TokenResponse, UserProfile},
};

/// Access token lifetime assumed when the provider does not state one.
const DEFAULT_EXPIRES_IN: u64 = 3600;

/// OAuth 2.0 authorization-code client for Spotify's accounts service.
///
/// Holds the confidential client credentials; every token request is
/// authenticated with HTTP Basic auth built from them. The client never
/// stores tokens, it only exchanges them.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: Client,
    client_id: String,
    client_secret: String,
    auth_url: Url,
    token_url: Url,
    api_url: Url,
}

impl AuthClient {
    pub fn new(http: Client, config: &Config) -> Self {
        AuthClient {
            http,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            auth_url: config.spotify_auth_url.clone(),
            token_url: config.spotify_token_url.clone(),
            api_url: config.spotify_api_url.clone(),
        }
    }

    /// Builds the provider URL the browser is sent to at login.
    ///
    /// # Arguments
    ///
    /// * `redirect_uri` - Callback registered with the provider
    /// * `state` - Per-attempt CSRF token, echoed back on the callback
    pub fn authorize_url(&self, redirect_uri: &str, state: &str) -> Url {
        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("scope", SCOPE)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("state", state);
        url
    }

    /// Exchanges an authorization code for an access/refresh token pair.
    ///
    /// # Errors
    ///
    /// Any non-200 answer, transport failure, or a response without a
    /// refresh token fails with [`Error::AuthExchange`].
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenPair> {
        let token = self
            .request_token(&[
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .await?;

        let refresh_token = token.refresh_token.clone().ok_or_else(|| {
            Error::AuthExchange("token response is missing refresh_token".to_string())
        })?;

        Ok(token_pair(token, refresh_token))
    }

    /// Trades a refresh token for a fresh access token.
    ///
    /// The provider does not always rotate refresh tokens; when the response
    /// omits one, the token passed in is handed back.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair> {
        let token = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .await?;

        let refresh_token = token
            .refresh_token
            .clone()
            .unwrap_or_else(|| refresh_token.to_string());

        Ok(token_pair(token, refresh_token))
    }

    /// Retrieves the profile behind an access token.
    ///
    /// Used after login to confirm the token and log the user id.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<UserProfile> {
        let url = self
            .api_url
            .join("me")
            .map_err(|e| Error::AuthExchange(e.to_string()))?;

        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| Error::AuthExchange(e.without_url().to_string()))?;

        let response = ensure_ok(response, "profile")?;
        response
            .json::<UserProfile>()
            .await
            .map_err(|e| Error::AuthExchange(e.without_url().to_string()))
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self
            .http
            .post(self.token_url.clone())
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(form)
            .send()
            .await
            .map_err(|e| Error::AuthExchange(e.without_url().to_string()))?;

        let response = ensure_ok(response, "token")?;
        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| Error::AuthExchange(e.without_url().to_string()))
    }
}

/// Only a 200 counts as success; the body of anything else is dropped
/// unread so it cannot leak into logs or responses.
fn ensure_ok(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(Error::AuthExchange(format!(
            "{what} endpoint returned {status}"
        )));
    }
    Ok(response)
}

fn token_pair(token: TokenResponse, refresh_token: String) -> TokenPair {
    TokenPair {
        access_token: token.access_token,
        refresh_token,
        expires_in: token.expires_in.unwrap_or(DEFAULT_EXPIRES_IN),
    }
}
