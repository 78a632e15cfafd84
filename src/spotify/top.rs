use reqwest::Client;
use url::Url;

use crate::{
    config::Config,
    error::{Error, Result},
    types::{Paging, TimeRange, TopEntity, TopKind},
};

/// Parameters of a top-items request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopQuery {
    pub limit: u32,
    pub time_range: TimeRange,
}

impl TopQuery {
    pub const MAX_LIMIT: u32 = 50;

    /// Checks `limit` against the range the provider accepts.
    pub fn new(limit: u32, time_range: TimeRange) -> Result<Self> {
        if !(1..=Self::MAX_LIMIT).contains(&limit) {
            return Err(Error::Validation(format!(
                "limit must be between 1 and {}",
                Self::MAX_LIMIT
            )));
        }
        Ok(TopQuery { limit, time_range })
    }
}

impl Default for TopQuery {
    fn default() -> Self {
        TopQuery {
            limit: 10,
            time_range: TimeRange::MediumTerm,
        }
    }
}

/// Reads a user's top tracks and artists with a caller-supplied token.
///
/// No OAuth happens here: an expired or invalid token surfaces as
/// [`Error::Fetch`] and refreshing is up to the caller.
#[derive(Debug, Clone)]
pub struct TopClient {
    http: Client,
    api_url: Url,
}

impl TopClient {
    pub fn new(http: Client, config: &Config) -> Self {
        TopClient {
            http,
            api_url: config.spotify_api_url.clone(),
        }
    }

    /// GET /me/top/{kind}?limit=&time_range=
    pub async fn fetch_top(
        &self,
        access_token: &str,
        kind: TopKind,
        query: TopQuery,
    ) -> Result<Paging<TopEntity>> {
        let url = self
            .api_url
            .join(&format!("me/top/{kind}"))
            .map_err(|e| Error::Fetch(e.to_string()))?;

        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(&[
                ("limit", query.limit.to_string()),
                ("time_range", query.time_range.to_string()),
            ])
            .send()
            .await
            .map_err(|e| Error::Fetch(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!("top {kind} request returned {status}")));
        }

        response
            .json::<Paging<TopEntity>>()
            .await
            .map_err(|e| Error::Fetch(e.without_url().to_string()))
    }
}
