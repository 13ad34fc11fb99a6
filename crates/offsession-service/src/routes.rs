//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{charges, client_config, health, webhooks};
use crate::state::AppState;

/// Maximum concurrent off-session charges.
/// Each one makes three sequential calls to Stripe.
const CHARGE_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// - `GET /health` - Health check
/// - `GET /config` - Publishable key for the browser client
/// - `POST /charge-card-off-session` - Charge a saved card
/// - `POST /webhook` - Stripe webhooks (signature verification)
/// - everything else - static files from `STATIC_DIR`, when configured
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;
    let static_dir = state.config.static_dir.clone();

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    // Merged outside the timeout layer: the charge flow enforces the request
    // timeout itself and reports it as `provider_timeout`.
    let charge_routes = Router::new()
        .route("/charge-card-off-session", post(charges::charge_card_off_session))
        .layer(ConcurrencyLimitLayer::new(CHARGE_MAX_CONCURRENT_REQUESTS));

    let mut router = Router::new()
        .route("/health", get(health::health))
        .route("/config", get(client_config::client_config))
        // Webhooks (no rate limit - controlled by Stripe)
        .route("/webhook", post(webhooks::stripe_webhook));

    if let Some(dir) = static_dir {
        tracing::info!(static_dir = %dir.display(), "Serving static files");
        let index = ServeFile::new(dir.join("index.html"));
        router = router
            .route_service("/", index)
            .fallback_service(ServeDir::new(dir));
    }

    router
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .merge(charge_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
