//! Fake Spotify and Gemini endpoints for integration tests.
//!
//! One axum router plays the accounts service, the Web API and the
//! completion API, and counts every hit so tests can assert that a request
//! never left the relay.
#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU16, AtomicUsize, Ordering},
    },
};

use axum::{
    Form, Json, Router,
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sporacle::{config::Config, server::build_router, state::AppState};
use tokio::net::TcpListener;
use tower::ServiceExt;

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";
pub const GEMINI_KEY: &str = "test-gemini-key";
pub const GOOD_CODE: &str = "good-code";
pub const NO_PROFILE_CODE: &str = "no-profile-code";
pub const ACCESS_TOKEN: &str = "access-1";
pub const REFRESH_TOKEN: &str = "refresh-1";

#[derive(Default)]
pub struct Hits {
    pub token: AtomicUsize,
    pub profile: AtomicUsize,
    pub top: AtomicUsize,
    pub completion: AtomicUsize,
    /// Completion calls still to be answered with 429.
    pub rate_limits_left: AtomicUsize,
    /// Non-zero forces this status on every completion call.
    pub completion_status: AtomicU16,
    pub last_completion: Mutex<Option<Value>>,
}

impl Hits {
    pub fn token(&self) -> usize {
        self.token.load(Ordering::SeqCst)
    }

    pub fn top(&self) -> usize {
        self.top.load(Ordering::SeqCst)
    }

    pub fn completion(&self) -> usize {
        self.completion.load(Ordering::SeqCst)
    }
}

pub struct Upstream {
    pub addr: SocketAddr,
    pub hits: Arc<Hits>,
}

impl Upstream {
    pub async fn spawn() -> Self {
        let hits = Arc::new(Hits::default());
        let app = Router::new()
            .route("/api/token", post(token))
            .route("/v1/me", get(profile))
            .route("/v1/me/top/{kind}", get(top))
            .route("/v1beta/models/{call}", post(generate_content))
            .with_state(Arc::clone(&hits));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Upstream { addr, hits }
    }

    /// Configuration pointing every external endpoint at this fake.
    pub fn config(&self) -> Config {
        let base = format!("http://{}", self.addr);
        let vars: HashMap<&str, String> = HashMap::from([
            ("SPOTIFY_CLIENT_ID", CLIENT_ID.to_string()),
            ("SPOTIFY_CLIENT_SECRET", CLIENT_SECRET.to_string()),
            ("GEMINI_API_KEY", GEMINI_KEY.to_string()),
            ("SPOTIFY_AUTH_URL", format!("{base}/authorize")),
            ("SPOTIFY_TOKEN_URL", format!("{base}/api/token")),
            ("SPOTIFY_API_URL", format!("{base}/v1")),
            ("GEMINI_API_URL", format!("{base}/v1beta")),
            ("GEMINI_MODEL", "gemini-test".to_string()),
            ("SPORACLE_RETRY_MAX_ATTEMPTS", "3".to_string()),
            ("SPORACLE_RETRY_BASE_DELAY_MS", "1".to_string()),
        ]);

        Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    pub fn router(&self) -> Router {
        build_router(Arc::new(AppState::new(self.config()).unwrap()))
    }

    /// Sends one request through a fresh relay router.
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router().oneshot(request).await.unwrap()
    }
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

pub fn set_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn token(
    State(hits): State<Arc<Hits>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    hits.token.fetch_add(1, Ordering::SeqCst);

    let expected = format!("Basic {}", STANDARD.encode(format!("{CLIENT_ID}:{CLIENT_SECRET}")));
    if headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid_client" })))
            .into_response();
    }

    let invalid_grant = || {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant", "error_description": "secret detail" })),
        )
            .into_response()
    };

    match form.get("grant_type").map(String::as_str) {
        Some("authorization_code") => {
            if form.get("redirect_uri").map(String::as_str)
                != Some("http://localhost:8888/callback")
            {
                return invalid_grant();
            }
            match form.get("code").map(String::as_str) {
                Some(GOOD_CODE) => Json(json!({
                    "access_token": ACCESS_TOKEN,
                    "token_type": "Bearer",
                    "refresh_token": REFRESH_TOKEN,
                    "expires_in": 3600,
                    "scope": "user-read-private user-read-email user-top-read",
                }))
                .into_response(),
                Some(NO_PROFILE_CODE) => Json(json!({
                    "access_token": "access-no-profile",
                    "refresh_token": "refresh-no-profile",
                    "expires_in": 3600,
                }))
                .into_response(),
                _ => invalid_grant(),
            }
        }
        Some("refresh_token") => match form.get("refresh_token").map(String::as_str) {
            Some(REFRESH_TOKEN) => Json(json!({ "access_token": "access-2" }))
            .into_response(),
            Some("rotating") => Json(json!({
                "access_token": "access-3",
                "refresh_token": "rotated",
                "expires_in": 1800,
            }))
            .into_response(),
            _ => invalid_grant(),
        },
        _ => invalid_grant(),
    }
}

async fn profile(State(hits): State<Arc<Hits>>, headers: HeaderMap) -> Response {
    hits.profile.fetch_add(1, Ordering::SeqCst);
    match bearer(&headers) {
        Some(ACCESS_TOKEN) => Json(json!({ "id": "listener", "display_name": "Listener" }))
            .into_response(),
        _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn top(
    State(hits): State<Arc<Hits>>,
    Path(kind): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    hits.top.fetch_add(1, Ordering::SeqCst);
    if bearer(&headers) != Some(ACCESS_TOKEN) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "status": 401, "message": "The access token expired" } })),
        )
            .into_response();
    }

    let limit: u32 = query.get("limit").and_then(|l| l.parse().ok()).unwrap_or(20);
    let time_range = query.get("time_range").cloned().unwrap_or_default();
    let items = match kind.as_str() {
        "tracks" => json!([
            { "id": "t1", "name": "Track One", "popularity": 71, "time_range": time_range },
            { "id": "t2", "name": "Track Two", "popularity": 42, "time_range": time_range },
        ]),
        "artists" => json!([
            { "id": "a1", "name": "Artist One", "genres": ["shoegaze"], "time_range": time_range },
        ]),
        _ => return StatusCode::NOT_FOUND.into_response(),
    };

    Json(json!({
        "href": format!("/v1/me/top/{kind}"),
        "items": items,
        "limit": limit,
        "offset": 0,
        "total": 2,
        "next": null,
        "previous": null,
    }))
    .into_response()
}

async fn generate_content(
    State(hits): State<Arc<Hits>>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    hits.completion.fetch_add(1, Ordering::SeqCst);

    if call != "gemini-test:generateContent" {
        return StatusCode::NOT_FOUND.into_response();
    }
    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some(GEMINI_KEY) {
        return StatusCode::FORBIDDEN.into_response();
    }

    *hits.last_completion.lock().unwrap() = Some(body);

    let left = hits.rate_limits_left.load(Ordering::SeqCst);
    if left > 0 {
        hits.rate_limits_left.store(left - 1, Ordering::SeqCst);
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": { "code": 429, "status": "RESOURCE_EXHAUSTED" } })),
        )
            .into_response();
    }

    let forced = hits.completion_status.load(Ordering::SeqCst);
    if forced != 0 {
        return (
            StatusCode::from_u16(forced).unwrap(),
            Json(json!({ "error": { "message": "internal upstream detail" } })),
        )
            .into_response();
    }

    Json(json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": "The stars " }, { "text": "align." }]
            },
            "finishReason": "STOP"
        }]
    }))
    .into_response()
}
