use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension, Json,
    extract::Query,
    response::{IntoResponse, Response},
};

use crate::{
    error::{Error, Result},
    spotify::TopQuery,
    state::AppState,
    types::{TimeRange, TopKind, TopTracksAndArtists},
    warning,
};

/// `GET /api/top-tracks-and-artists?access_token[&limit][&time_range]`
pub async fn top_tracks_and_artists(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<Arc<AppState>>,
) -> Response {
    let Some(access_token) = params.get("access_token").filter(|t| !t.is_empty()) else {
        return Error::Validation("Access token is required".to_string()).into_response();
    };

    let query = match top_query(&params) {
        Ok(query) => query,
        Err(e) => return e.into_response(),
    };

    let fetched = tokio::try_join!(
        state.top.fetch_top(access_token, TopKind::Tracks, query),
        state.top.fetch_top(access_token, TopKind::Artists, query),
    );

    match fetched {
        Ok((top_tracks, top_artists)) => Json(TopTracksAndArtists {
            top_tracks,
            top_artists,
        })
        .into_response(),
        Err(e) => {
            warning!("Failed to fetch top tracks or top artists: {}", e);
            e.into_response()
        }
    }
}

fn top_query(params: &HashMap<String, String>) -> Result<TopQuery> {
    let defaults = TopQuery::default();

    let limit = match params.get("limit") {
        Some(raw) => raw
            .parse()
            .map_err(|_| Error::Validation(format!("limit must be a number, got '{raw}'")))?,
        None => defaults.limit,
    };
    let time_range = match params.get("time_range") {
        Some(raw) => raw.parse::<TimeRange>()?,
        None => defaults.time_range,
    };

    TopQuery::new(limit, time_range)
}
