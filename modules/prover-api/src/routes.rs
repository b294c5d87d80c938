use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{get, post, put},
    Router,
};
use prover_common::Config;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

use crate::rest;
use crate::AppState;

pub fn build_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let mut app = Router::new()
        .route("/health", get(rest::health))
        // SNARK API
        .route("/api/v1/snark", post(rest::submit::api_submit))
        .route(
            "/api/v1/snark/{id}",
            get(rest::api_get_snark).delete(rest::api_delete_snark),
        )
        .route("/api/v1/snark/{id}/status", put(rest::api_update_status))
        .route("/api/v1/snarks", get(rest::api_list_snarks))
        // Read-only inspection
        .route("/api/v1/peek/{*path}", get(rest::api_peek));

    // Static UI
    match &config.web_dir {
        Some(dir) if dir.is_dir() => {
            info!(dir = %dir.display(), "Serving static files");
            app = app.fallback_service(ServeDir::new(dir));
        }
        Some(dir) => warn!(dir = %dir.display(), "Web directory not found, static UI disabled"),
        None => {}
    }

    app.with_state(state)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Method + path + status + latency only
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}
