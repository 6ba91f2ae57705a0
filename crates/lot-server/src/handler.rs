use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use lot_dispatch::OperationTable;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::router::AppState;

/// Body of `POST /v1/invoke`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InvokeRequest {
    pub operation: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Health check handler.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Info handler.
pub async fn info_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let operations: Vec<&str> = state.host.table().names().collect();
    Json(json!({
        "name": "lot-server",
        "version": env!("CARGO_PKG_VERSION"),
        "node_id": state.host.ledger().node_id(),
        "operations": operations,
    }))
}

/// The full operation table.
pub async fn operations_handler(State(state): State<AppState>) -> Json<OperationTable> {
    Json(state.host.table().clone())
}

/// Run one invocation in its own transaction.
pub async fn invoke_handler(
    State(state): State<AppState>,
    Json(request): Json<InvokeRequest>,
) -> Response {
    if request.args.len() > state.max_args {
        tracing::debug!(
            operation = %request.operation,
            args = request.args.len(),
            "rejecting oversized invocation"
        );
        return error_body(
            StatusCode::BAD_REQUEST,
            format!(
                "too many arguments: {} exceeds the limit of {}",
                request.args.len(),
                state.max_args
            ),
        );
    }

    let host = state.host.clone();
    let outcome =
        tokio::task::spawn_blocking(move || host.invoke(&request.operation, &request.args)).await;

    match outcome {
        Ok(lot_dispatch::Response::Success { payload }) => success_body(payload),
        Ok(lot_dispatch::Response::Failure { message }) => {
            error_body(StatusCode::INTERNAL_SERVER_ERROR, message)
        }
        Err(e) => {
            tracing::warn!(error = %e, "invocation task failed");
            error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

fn success_body(payload: Vec<u8>) -> Response {
    if payload.is_empty() {
        return StatusCode::OK.into_response();
    }
    let content_type = if serde_json::from_slice::<serde::de::IgnoredAny>(&payload).is_ok() {
        "application/json"
    } else {
        "application/octet-stream"
    };
    (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], payload).into_response()
}

fn error_body(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
