//! Route definitions and router construction.

use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::auth::validate_bearer;
use crate::bootstrap::{AppContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            use axum::http::HeaderValue;
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Build the `/v1` routes without prefix (for nesting).
///
/// Returns `Router<AppState>` WITHOUT `.with_state()` applied; the caller
/// applies state before nesting.
pub(crate) fn v1_routes() -> Router<AppState> {
    Router::new()
        .route("/models", get(handlers::models::list))
        .route("/chat/completions", post(handlers::chat::completions))
}

/// Create the main Axum router.
///
/// Bearer auth and CORS apply to `/v1` only; `/health` stays open.
pub fn create_router(ctx: AppContext, cors_config: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer(cors_config);

    let expected = Arc::clone(&state.auth_header);
    let auth_layer = middleware::from_fn(move |req: Request, next: Next| {
        let expected = Arc::clone(&expected);
        async move { validate_bearer(expected, req, next).await }
    });

    Router::new()
        .route("/health", get(health_check))
        .nest(
            "/v1",
            v1_routes()
                .route_layer(auth_layer)
                .with_state(state)
                .layer(cors),
        )
        .fallback(not_found)
}

/// Health check endpoint.
pub(crate) async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Unknown paths get a short plain hint instead of an empty 404.
async fn not_found(req: Request) -> (axum::http::StatusCode, &'static str) {
    tracing::info!(path = %req.uri().path(), "no route for path");
    (
        axum::http::StatusCode::NOT_FOUND,
        "Service is running; use a valid request path",
    )
}
