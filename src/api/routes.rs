//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    calls_handler, health_handler, page_count_handler, page_handler, retrieve_handler,
    store_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /store` - Store a value under a generated key
/// - `GET /retrieve/:key` - Retrieve a value (`?as=raw|text|int`)
/// - `GET /page?url=` - Fetch a page through the TTL cache
/// - `GET /page/count?url=` - Access count for a URL
/// - `GET /calls/:method` - Call count and history of an instrumented method
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/store", post(store_handler))
        .route("/retrieve/:key", get(retrieve_handler))
        .route("/page", get(page_handler))
        .route("/page/count", get(page_count_handler))
        .route("/calls/:method", get(calls_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
