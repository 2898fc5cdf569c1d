//! Sync API handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::catalog::ErrorResponse;
use crate::state::{AppState, SyncRunError};

/// POST /api/v1/sync
///
/// Runs one pass and returns its report. 409 while another pass is running;
/// 500 with the report when the catalog could not be saved.
pub async fn trigger_sync(State(state): State<Arc<AppState>>) -> Response {
    match state.run_sync().await {
        Ok(outcome) => (StatusCode::OK, Json(outcome.report)).into_response(),
        Err(SyncRunError::Busy) => {
            ErrorResponse::into_response_with(StatusCode::CONFLICT, SyncRunError::Busy)
        }
        Err(SyncRunError::Registry(e)) => {
            ErrorResponse::into_response_with(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
        Err(SyncRunError::Pass(e)) => {
            let body = serde_json::json!({
                "error": e.to_string(),
                "report": e.outcome().report,
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// GET /api/v1/sync/last
///
/// Report of the most recent pass run by this process.
pub async fn last_report(State(state): State<Arc<AppState>>) -> Response {
    match state.last_report().await {
        Some(report) => Json(report).into_response(),
        None => ErrorResponse::into_response_with(StatusCode::NOT_FOUND, "No sync pass has run yet"),
    }
}
