//! Live HTML page.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::Utc;
use tracing::error;
use vidcat_core::render::{escape_html, render_index};

use crate::state::AppState;

/// GET /
///
/// Rendered from the two documents on every request.
pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    let registry = match state.registry() {
        Ok(registry) => registry,
        Err(e) => {
            error!(error = %e, "Failed to load channel registry");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!(
                    "<h1>Channel registry unavailable</h1><p>{}</p>",
                    escape_html(&e.to_string())
                )),
            )
                .into_response();
        }
    };

    let catalog = state.store().load(&registry);
    Html(render_index(&catalog, &registry, Utc::now())).into_response()
}
