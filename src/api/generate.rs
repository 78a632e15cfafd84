use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::{error::Error, state::AppState, types::CompletionResult, warning};

/// `POST /generate-response` with `{trackNames: [...], artistNames: [...]}`.
///
/// A body that is not JSON at all is treated like one with missing fields.
pub async fn generate_response(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = payload.map(|Json(body)| body).unwrap_or(Value::Null);

    match state.completion.build_and_submit(&body).await {
        Ok(response) => Json(CompletionResult { response }).into_response(),
        Err(e @ Error::Validation(_)) => e.into_response(),
        Err(e) => {
            warning!("Completion error: {}", e);
            e.into_response()
        }
    }
}
