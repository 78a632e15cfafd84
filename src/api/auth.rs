use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension, Json,
    extract::Query,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    error::Error,
    info,
    state::AppState,
    utils::{self, STATE_COOKIE, STATE_LENGTH},
    warning,
};

/// `GET /login`: stores a fresh state cookie and sends the browser to the
/// provider's consent page.
pub async fn login(Extension(state): Extension<Arc<AppState>>) -> Response {
    let auth_state = utils::generate_state(STATE_LENGTH);
    let location = state
        .auth
        .authorize_url(&state.config.redirect_uri, &auth_state);

    found(location.as_str(), utils::state_cookie(&auth_state))
}

/// `GET /callback?code&state`: completes the authorization-code flow.
///
/// The state check runs before anything is sent to the provider. The state
/// cookie is cleared on every outcome, so each login attempt is single use.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    let clear = utils::clear_state_cookie();
    let stored_state = utils::read_cookie(&headers, STATE_COOKIE);

    let state_matches = matches!(
        (params.get("state"), stored_state.as_ref()),
        (Some(received), Some(stored)) if !received.is_empty() && received == stored
    );
    if !state_matches {
        warning!("Callback rejected: {}", Error::StateMismatch);
        return found(
            &utils::fragment_location(&[("error", "state_mismatch")]),
            clear,
        );
    }

    let Some(code) = params.get("code").filter(|c| !c.is_empty()) else {
        warning!("Callback without authorization code");
        return found(&utils::fragment_location(&[("error", "invalid_token")]), clear);
    };

    let tokens = match state
        .auth
        .exchange_code(code, &state.config.redirect_uri)
        .await
    {
        Ok(tokens) => tokens,
        Err(e) => {
            warning!("Callback error: {}", e);
            return found(&utils::fragment_location(&[("error", "invalid_token")]), clear);
        }
    };

    match state.auth.fetch_profile(&tokens.access_token).await {
        Ok(profile) => info!("User logged in: {}", profile.id),
        Err(e) => warning!("Profile lookup after login failed: {}", e),
    }

    found(
        &utils::fragment_location(&[
            ("access_token", &tokens.access_token),
            ("refresh_token", &tokens.refresh_token),
        ]),
        clear,
    )
}

/// `GET /refresh_token?refresh_token`
pub async fn refresh_token(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<Arc<AppState>>,
) -> Response {
    let Some(refresh_token) = params.get("refresh_token").filter(|t| !t.is_empty()) else {
        return Error::Validation("Refresh token is required".to_string()).into_response();
    };

    match state.auth.refresh_token(refresh_token).await {
        Ok(tokens) => Json(json!({
            "access_token": tokens.access_token,
            "refresh_token": tokens.refresh_token,
            "expires_in": tokens.expires_in,
        }))
        .into_response(),
        Err(e) => {
            warning!("Refresh token error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to refresh token" })),
            )
                .into_response()
        }
    }
}

/// 302 redirect that also sets a cookie.
fn found(location: &str, cookie: String) -> Response {
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, location.to_string()),
            (header::SET_COOKIE, cookie),
        ],
    )
        .into_response()
}
