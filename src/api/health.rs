use axum::response::Json;
use serde_json::{Value, json};

/// `GET /` liveness probe.
pub async fn root() -> &'static str {
    "Sporacle backend is running."
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn not_found() -> (axum::http::StatusCode, Json<Value>) {
    (
        axum::http::StatusCode::NOT_FOUND,
        Json(json!({ "error": "Endpoint not found" })),
    )
}
