use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{catalog, handlers, middleware::metrics_middleware, page, sync};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Catalog (read-only views of the persisted documents)
        .route("/videos", get(catalog::get_videos))
        .route("/registry", get(catalog::get_registry))
        .route("/catalog/stats", get(catalog::get_stats))
        .route("/catalog/{category}/{channel}", get(catalog::get_channel))
        // Sync
        .route("/sync", post(sync::trigger_sync))
        .route("/sync/last", get(sync::last_report));

    Router::new()
        .route("/", get(page::index))
        .route("/metrics", get(handlers::metrics))
        .nest("/api/v1", api_routes)
        .route_layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
