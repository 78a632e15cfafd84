//! Prompt wording for the oracle reading.
//!
//! The wording is data rather than code: a [`PromptTemplate`] holds a fixed
//! system persona and a user message with the named placeholders `{tracks}`
//! and `{artists}`. The built-in template can be swapped for a JSON file of
//! the same shape.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const DEFAULT_SYSTEM: &str = "You are an oracle providing astrological and divination-type readings \
based on the user's Spotify top tracks and artists. Be detailed, specific, and creative.";

const DEFAULT_USER: &str = "Generate a psychological reading based on the following top tracks and \
artists. You are to do this reading in a very astrological and superstitious manner, like an oracle \
reading. Tracks: {tracks}. Artists: {artists}.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub system: String,
    pub user: String,
}

/// A template with the names filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        PromptTemplate {
            system: DEFAULT_SYSTEM.to_string(),
            user: DEFAULT_USER.to_string(),
        }
    }
}

impl PromptTemplate {
    /// Reads a `{ "system": ..., "user": ... }` JSON file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = async_fs::read_to_string(path)
            .await
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let template: PromptTemplate = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid prompt template {}: {e}", path.display())))?;
        Ok(template)
    }

    /// Substitutes the comma-joined names into the user message.
    ///
    /// Order of the names is preserved; the system persona is never touched.
    pub fn render(&self, track_names: &[String], artist_names: &[String]) -> Prompt {
        let tracks = track_names.join(", ");
        let artists = artist_names.join(", ");

        // Names may contain placeholder text themselves, so substitute in one pass.
        let user = self
            .user
            .split("{tracks}")
            .map(|part| part.replace("{artists}", &artists))
            .collect::<Vec<_>>()
            .join(&tracks);

        Prompt {
            system: self.system.clone(),
            user,
        }
    }
}
