//! # Completion Module
//!
//! Builds the oracle prompt from a listener's top track and artist names and
//! submits it to the Gemini `generateContent` endpoint.
//!
//! Submission runs through [`Backoff`]: an HTTP 429 from the completion API
//! is the only retryable signal, everything else fails the request at once.
//! The first candidate's text is returned exactly as generated.

mod prompt;

pub use prompt::{Prompt, PromptTemplate};

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::{
    backoff::Backoff,
    config::Config,
    error::{Error, Result},
    info,
    types::CompletionRequest,
};

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub candidate_count: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            max_output_tokens: 2000,
            temperature: 0.9,
            candidate_count: 1,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Value>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn first_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part["text"].as_str())
            .collect();

        (!content.parts.is_empty()).then_some(text)
    }
}

/// Client for the text-generation API.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: Client,
    endpoint: Url,
    api_key: String,
    template: PromptTemplate,
    generation: GenerationConfig,
    backoff: Backoff,
}

impl CompletionClient {
    pub fn new(http: Client, config: &Config) -> Result<Self> {
        let endpoint = config
            .completion_api_url
            .join(&format!("models/{}:generateContent", config.completion_model))
            .map_err(|e| Error::Config(format!("invalid completion endpoint: {e}")))?;

        Ok(CompletionClient {
            http,
            endpoint,
            api_key: config.completion_api_key.clone(),
            template: config.prompt.clone(),
            generation: config.generation,
            backoff: config.backoff,
        })
    }

    /// Validates a `/generate-response` body and submits the reading.
    ///
    /// Missing or non-array `trackNames`/`artistNames` fail with
    /// [`Error::Validation`] before anything is sent.
    pub async fn build_and_submit(&self, body: &Value) -> Result<String> {
        let request = CompletionRequest::from_json(body)?;
        self.submit(&request).await
    }

    /// Renders the prompt for `request` and drives it through the backoff
    /// executor.
    pub async fn submit(&self, request: &CompletionRequest) -> Result<String> {
        let prompt = self
            .template
            .render(&request.track_names, &request.artist_names);

        let text = self
            .backoff
            .execute(|| self.generate(&prompt), |e| matches!(e, Error::RateLimited))
            .await?;

        info!(
            "Completion generated for tracks: {}, artists: {}",
            request.track_names.len(),
            request.artist_names.len()
        );
        Ok(text)
    }

    /// Issues one `generateContent` call.
    async fn generate(&self, prompt: &Prompt) -> Result<String> {
        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: [Part {
                    text: &prompt.system,
                }],
            },
            contents: [Content {
                role: Some("user"),
                parts: [Part { text: &prompt.user }],
            }],
            generation_config: self.generation,
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Upstream(e.without_url().to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited);
        }
        if !status.is_success() {
            return Err(Error::Upstream(format!("completion API returned {status}")));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Upstream(e.without_url().to_string()))?;

        payload
            .first_text()
            .ok_or_else(|| Error::Upstream("completion API returned no candidate text".to_string()))
    }
}
