//! Configuration management for the sporacle relay.
//!
//! Configuration is read once at startup into a [`Config`] value that is then
//! handed to every component constructor. Nothing reads the environment after
//! that point, so components can be built in tests with fake credentials and
//! local endpoints through [`Config::from_lookup`].
//!
//! Values are resolved in this order:
//! 1. Environment variables (highest priority)
//! 2. `.env` in the working directory
//! 3. `.env` in the local data directory
//! 4. Built-in defaults (where applicable)

use std::{
    env, fmt,
    net::{Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use url::Url;

use crate::{
    backoff::Backoff,
    completion::{GenerationConfig, PromptTemplate},
    error::{Error, Result},
};

/// Redirect URI registered with the provider.
pub const REDIRECT_URI: &str = "http://localhost:8888/callback";

/// Port the relay listens on.
pub const PORT: u16 = 8888;

/// Permissions requested at login.
pub const SCOPE: &str = "user-read-private user-read-email user-top-read";

const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_API_URL: &str = "https://api.spotify.com/v1/";
const DEFAULT_COMPLETION_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
const DEFAULT_COMPLETION_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Loads environment variables from `.env` files.
///
/// The working directory is consulted first, then the platform-specific
/// local data directory under `sporacle/.env`:
/// - Linux: `~/.local/share/sporacle/.env`
/// - macOS: `~/Library/Application Support/sporacle/.env`
/// - Windows: `%LOCALAPPDATA%/sporacle/.env`
///
/// Variables already present in the environment are never overwritten.
/// Missing files are not an error.
///
/// # Errors
///
/// Returns an error if the local data directory cannot be created or an
/// existing `.env` file cannot be parsed.
pub async fn load_env() -> std::result::Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sporacle/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    for candidate in [PathBuf::from(".env"), path] {
        if candidate.is_file() {
            dotenv::from_path(&candidate).map_err(|e| e.to_string())?;
        }
    }

    Ok(())
}

/// Process-wide, read-only settings.
#[derive(Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub completion_api_key: String,
    pub redirect_uri: String,
    pub server_addr: SocketAddr,
    pub spotify_auth_url: Url,
    pub spotify_token_url: Url,
    pub spotify_api_url: Url,
    pub completion_api_url: Url,
    pub completion_model: String,
    pub generation: GenerationConfig,
    pub prompt: PromptTemplate,
    /// JSON file replacing the built-in prompt, applied by [`Config::load_prompt`].
    pub prompt_file: Option<PathBuf>,
    pub backoff: Backoff,
    pub http_timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("completion_api_key", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("server_addr", &self.server_addr)
            .field("spotify_auth_url", &self.spotify_auth_url.as_str())
            .field("spotify_token_url", &self.spotify_token_url.as_str())
            .field("spotify_api_url", &self.spotify_api_url.as_str())
            .field("completion_api_url", &self.completion_api_url.as_str())
            .field("completion_model", &self.completion_model)
            .field("prompt_file", &self.prompt_file)
            .field("backoff", &self.backoff)
            .field("http_timeout", &self.http_timeout)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Builds the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Config`] if a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| get(key).ok_or_else(|| Error::Config(format!("{key} must be set")));

        let url = |key: &str, default: &str| -> Result<Url> {
            let raw = get(key).unwrap_or_else(|| default.to_string());
            Url::parse(&raw).map_err(|e| Error::Config(format!("{key} is not a valid URL: {e}")))
        };

        let number = |key: &str, default: u64| -> Result<u64> {
            match get(key) {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|e| Error::Config(format!("{key} is not a number: {e}"))),
                None => Ok(default),
            }
        };

        let defaults = Backoff::default();
        let max_attempts = number("SPORACLE_RETRY_MAX_ATTEMPTS", defaults.max_attempts.into())?;
        let base_delay_ms = number(
            "SPORACLE_RETRY_BASE_DELAY_MS",
            defaults.base_delay.as_millis() as u64,
        )?;

        Ok(Config {
            client_id: required("SPOTIFY_CLIENT_ID")?,
            client_secret: required("SPOTIFY_CLIENT_SECRET")?,
            completion_api_key: required("GEMINI_API_KEY")?,
            redirect_uri: REDIRECT_URI.to_string(),
            server_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, PORT)),
            spotify_auth_url: url("SPOTIFY_AUTH_URL", DEFAULT_AUTH_URL)?,
            spotify_token_url: url("SPOTIFY_TOKEN_URL", DEFAULT_TOKEN_URL)?,
            spotify_api_url: with_trailing_slash(url("SPOTIFY_API_URL", DEFAULT_API_URL)?),
            completion_api_url: with_trailing_slash(url(
                "GEMINI_API_URL",
                DEFAULT_COMPLETION_URL,
            )?),
            completion_model: get("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string()),
            generation: GenerationConfig::default(),
            prompt: PromptTemplate::default(),
            prompt_file: get("SPORACLE_PROMPT_FILE").map(PathBuf::from),
            backoff: Backoff::new(
                u32::try_from(max_attempts).map_err(|e| {
                    Error::Config(format!("SPORACLE_RETRY_MAX_ATTEMPTS is out of range: {e}"))
                })?,
                Duration::from_millis(base_delay_ms),
            ),
            http_timeout: Duration::from_secs(number(
                "SPORACLE_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
        })
    }
}

impl Config {
    /// Replaces the built-in prompt with the template in `prompt_file`, if
    /// one is configured.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Config`] if the file cannot be read or parsed.
    pub async fn load_prompt(&mut self) -> Result<()> {
        if let Some(path) = &self.prompt_file {
            self.prompt = PromptTemplate::load(path).await?;
        }
        Ok(())
    }
}

/// Loads the full configuration for the server.
///
/// Reads the environment and, when `SPORACLE_PROMPT_FILE` is set, replaces
/// the built-in prompt wording with the template stored in that file.
pub async fn load() -> Result<Config> {
    let mut config = Config::from_env()?;
    config.load_prompt().await?;
    Ok(config)
}

/// Base URLs are joined with relative paths, which drops the last segment
/// unless the path ends in a slash.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
