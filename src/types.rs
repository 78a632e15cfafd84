use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Tokens handed back to the browser after a successful exchange.
///
/// Never stored server-side; the client presents the access token again on
/// every call that needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: u64,
}

/// Raw body of the provider's token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
}

/// A top track or artist. Provider metadata is carried along untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopEntity {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
    pub href: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub total: Option<u32>,
    pub next: Option<String>,
    pub previous: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopTracksAndArtists {
    pub top_tracks: Paging<TopEntity>,
    pub top_artists: Paging<TopEntity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopKind {
    Tracks,
    Artists,
}

impl fmt::Display for TopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopKind::Tracks => write!(f, "tracks"),
            TopKind::Artists => write!(f, "artists"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeRange {
    ShortTerm,
    #[default]
    MediumTerm,
    LongTerm,
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeRange::ShortTerm => "short_term",
            TimeRange::MediumTerm => "medium_term",
            TimeRange::LongTerm => "long_term",
        };
        write!(f, "{s}")
    }
}

impl FromStr for TimeRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "short_term" => Ok(TimeRange::ShortTerm),
            "medium_term" => Ok(TimeRange::MediumTerm),
            "long_term" => Ok(TimeRange::LongTerm),
            other => Err(Error::Validation(format!(
                "time_range must be short_term, medium_term or long_term, got '{other}'"
            ))),
        }
    }
}

/// Names extracted from a `/generate-response` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub track_names: Vec<String>,
    pub artist_names: Vec<String>,
}

const NAMES_REQUIRED: &str = "Track names and artist names are required and should be arrays";

impl CompletionRequest {
    /// Validates an untyped JSON body.
    ///
    /// Both `trackNames` and `artistNames` must be present arrays of strings.
    /// Empty arrays are accepted.
    pub fn from_json(body: &Value) -> Result<Self> {
        Ok(CompletionRequest {
            track_names: names_field(body, "trackNames")?,
            artist_names: names_field(body, "artistNames")?,
        })
    }
}

fn names_field(body: &Value, key: &str) -> Result<Vec<String>> {
    let Some(Value::Array(items)) = body.get(key) else {
        return Err(Error::Validation(NAMES_REQUIRED.to_string()));
    };

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_owned)
                .ok_or_else(|| Error::Validation(format!("{key} must only contain strings")))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResult {
    pub response: String,
}
