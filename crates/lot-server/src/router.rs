use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use lot_dispatch::Host;
use tower_http::trace::TraceLayer;

use crate::handler;

/// Shared state of every route.
#[derive(Clone, Debug)]
pub struct AppState {
    pub host: Arc<Host>,
    pub max_args: usize,
}

/// Build the axum router with all Lotline endpoints.
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route("/v1/operations", get(handler::operations_handler))
        .route("/v1/invoke", post(handler::invoke_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
