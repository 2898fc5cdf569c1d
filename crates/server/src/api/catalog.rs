//! Catalog API handlers.
//!
//! Every request reads the documents from disk; the catalog goes through
//! the recovering store load, so a missing or broken document shows up as
//! an empty catalog rather than an error.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use vidcat_core::{Catalog, CatalogStats, ChannelRegistry, VideoRecord};

use crate::state::AppState;

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn into_response_with(status: StatusCode, error: impl ToString) -> Response {
        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CatalogStats,
    pub registered_channels: usize,
    pub location: String,
}

#[derive(Debug, Serialize)]
pub struct ChannelResponse {
    pub category: String,
    pub channel: String,
    pub reference: Option<String>,
    pub total: usize,
    pub videos: Vec<VideoRecord>,
}

fn load(state: &AppState) -> Result<(ChannelRegistry, Catalog), Response> {
    let registry = state
        .registry()
        .map_err(|e| ErrorResponse::into_response_with(StatusCode::INTERNAL_SERVER_ERROR, e))?;
    let catalog = state.store().load(&registry);
    Ok((registry, catalog))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/videos
///
/// The catalog document as JSON.
pub async fn get_videos(State(state): State<Arc<AppState>>) -> Result<Json<Catalog>, Response> {
    let (_, catalog) = load(&state)?;
    Ok(Json(catalog))
}

/// GET /api/v1/registry
pub async fn get_registry(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ChannelRegistry>, Response> {
    state
        .registry()
        .map(Json)
        .map_err(|e| ErrorResponse::into_response_with(StatusCode::INTERNAL_SERVER_ERROR, e))
}

/// GET /api/v1/catalog/stats
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<StatsResponse>, Response> {
    let (registry, catalog) = load(&state)?;
    Ok(Json(StatsResponse {
        stats: catalog.stats(),
        registered_channels: registry.channel_count(),
        location: state.store().location(),
    }))
}

/// GET /api/v1/catalog/{category}/{channel}
///
/// Known when either the registry or the catalog has the channel.
pub async fn get_channel(
    State(state): State<Arc<AppState>>,
    Path((category, channel)): Path<(String, String)>,
) -> Result<Json<ChannelResponse>, Response> {
    let (registry, catalog) = load(&state)?;

    let reference = registry
        .channels(&category)
        .and_then(|channels| channels.get(&channel))
        .cloned();
    let videos = catalog.channel(&category, &channel);

    if reference.is_none() && videos.is_none() {
        return Err(ErrorResponse::into_response_with(
            StatusCode::NOT_FOUND,
            format!("Channel not found: {category}/{channel}"),
        ));
    }

    let videos = videos.map(<[VideoRecord]>::to_vec).unwrap_or_default();
    Ok(Json(ChannelResponse {
        category,
        channel,
        reference,
        total: videos.len(),
        videos,
    }))
}
