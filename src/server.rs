use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{get, post},
};

use crate::{api, config::Config, error::Result, state::AppState, success, warning};

/// Wires the endpoints onto a router sharing `state`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(api::root))
        .route("/health", get(api::health))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/refresh_token", get(api::refresh_token))
        .route(
            "/api/top-tracks-and-artists",
            get(api::top_tracks_and_artists),
        )
        .route("/generate-response", post(api::generate_response))
        .fallback(api::not_found)
        .layer(Extension(state))
}

/// Binds the configured address and serves until the process ends.
///
/// With `open_browser` set, the login page is opened once the listener is up.
pub async fn start_api_server(config: Config, open_browser: bool) -> Result<()> {
    let addr = config.server_addr;
    let state = Arc::new(AppState::new(config)?);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    success!("Listening on {}", addr.port());

    if open_browser {
        let login_url = format!("http://localhost:{}/login", addr.port());
        if webbrowser::open(&login_url).is_err() {
            warning!(
                "Failed to open browser. Please navigate to the following URL manually:\n{}",
                login_url
            )
        }
    }

    axum::serve(listener, app).await?;
    Ok(())
}
