//! Channel handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::{ChannelRepository, NewChannel};
use crate::feed::Source;
use crate::web::dto::{
    ApiResponse, ChannelResponse, ChannelUrlRequest, ResolvedChannelResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET /api/channels - List subscribed channels.
pub async fn list_channels(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ChannelResponse>>>, ApiError> {
    let channels = ChannelRepository::new(state.db.pool()).list().await?;
    let responses = channels.into_iter().map(ChannelResponse::from).collect();
    Ok(Json(ApiResponse::new(responses)))
}

/// POST /api/channels - Resolve and subscribe to a channel.
pub async fn add_channel(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ChannelUrlRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ChannelResponse>>), ApiError> {
    let resolved = state.resolver.resolve(&req.url).await?;

    let repo = ChannelRepository::new(state.db.pool());
    if repo.exists(&resolved.channel_id).await? {
        return Err(ApiError::conflict("This channel is already added"));
    }

    let mut new_channel = NewChannel::new(resolved.channel_id, resolved.name);
    new_channel.handle = resolved.handle;
    new_channel.thumbnail_url = resolved.thumbnail_url;

    let channel = repo.create(&new_channel).await?;
    tracing::info!("Added channel {} ({})", channel.name, channel.channel_id);

    state.aggregator.on_source_added(&Source::from(&channel)).await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(ChannelResponse::from(channel))),
    ))
}

/// POST /api/channels/resolve - Preview a channel without adding it.
pub async fn resolve_channel(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ChannelUrlRequest>,
) -> Result<Json<ApiResponse<ResolvedChannelResponse>>, ApiError> {
    let resolved = state.resolver.resolve(&req.url).await?;
    let already_added = ChannelRepository::new(state.db.pool())
        .exists(&resolved.channel_id)
        .await?;

    Ok(Json(ApiResponse::new(ResolvedChannelResponse::new(
        resolved,
        already_added,
    ))))
}

/// DELETE /api/channels/:id - Unsubscribe from a channel.
pub async fn delete_channel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let repo = ChannelRepository::new(state.db.pool());

    let channel = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Channel not found"))?;

    if !repo.delete(id).await? {
        return Err(ApiError::not_found("Channel not found"));
    }
    tracing::info!("Removed channel {} ({})", channel.name, channel.channel_id);

    state.aggregator.on_source_removed(&channel.channel_id).await;

    Ok(StatusCode::NO_CONTENT)
}
