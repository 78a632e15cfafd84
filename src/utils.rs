use axum::http::{HeaderMap, header};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;

/// Name of the cookie carrying the pending OAuth state.
pub const STATE_COOKIE: &str = "spotify_auth_state";

/// Length of the state generated per login attempt.
pub const STATE_LENGTH: usize = 16;

/// Seconds a pending login stays valid.
pub const STATE_COOKIE_MAX_AGE: u64 = 600;

/// Generates an unguessable, URL-safe token of exactly `length` characters.
///
/// Bytes come from the thread-local CSPRNG (ChaCha seeded from the OS) and
/// are base64url encoded, so the result is safe in cookies and query strings.
pub fn generate_state(length: usize) -> String {
    let mut bytes = vec![0u8; (length * 3).div_ceil(4)];
    rand::rng().fill_bytes(&mut bytes);

    let mut token = URL_SAFE_NO_PAD.encode(bytes);
    token.truncate(length);
    token
}

/// `Set-Cookie` value storing `state` for the callback.
pub fn state_cookie(state: &str) -> String {
    format!(
        "{STATE_COOKIE}={state}; Path=/; HttpOnly; SameSite=Lax; Max-Age={STATE_COOKIE_MAX_AGE}"
    )
}

/// `Set-Cookie` value that invalidates the state cookie.
pub fn clear_state_cookie() -> String {
    format!("{STATE_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Reads a cookie value out of all `Cookie` headers of a request.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// Builds a client-side redirect target such as `/#error=state_mismatch`.
pub fn fragment_location(pairs: &[(&str, &str)]) -> String {
    let mut fragment = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        fragment.append_pair(key, value);
    }
    format!("/#{}", fragment.finish())
}
