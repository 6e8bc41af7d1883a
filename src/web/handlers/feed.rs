//! Feed handler.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::db::{ChannelRepository, WatchedRepository};
use crate::feed::Source;
use crate::web::dto::{ApiResponse, FeedResponse, VideoResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET /api/feed - Combined feed with watched state.
pub async fn get_feed(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<FeedResponse>>, ApiError> {
    let channels = ChannelRepository::new(state.db.pool()).list().await?;
    let next_update_at = state.aggregator.next_update_at();

    if channels.is_empty() {
        return Ok(Json(ApiResponse::new(FeedResponse {
            videos: Vec::new(),
            next_update_at,
        })));
    }

    let sources: Vec<Source> = channels.iter().map(Source::from).collect();
    let entries = state.aggregator.get_aggregate(&sources).await;

    // Watched state is never cached.
    let watched = WatchedRepository::new(state.db.pool()).list_ids().await?;

    let videos = entries
        .iter()
        .map(|entry| VideoResponse {
            watched: watched.contains(&entry.video_id),
            entry: entry.clone(),
        })
        .collect();

    Ok(Json(ApiResponse::new(FeedResponse {
        videos,
        next_update_at,
    })))
}
