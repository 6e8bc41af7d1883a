//! Watched state handlers.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::db::WatchedRepository;
use crate::web::dto::{ApiResponse, ValidatedJson, WatchedRequest, WatchedResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET /api/watched - List watched video ids.
pub async fn list_watched(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let mut ids: Vec<String> = WatchedRepository::new(state.db.pool())
        .list_ids()
        .await?
        .into_iter()
        .collect();
    ids.sort();

    Ok(Json(ApiResponse::new(ids)))
}

/// POST /api/watched - Mark or unmark a video.
pub async fn update_watched(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<WatchedRequest>,
) -> Result<Json<ApiResponse<WatchedResponse>>, ApiError> {
    let repo = WatchedRepository::new(state.db.pool());

    if req.undo {
        repo.unmark(&req.video_id).await?;
    } else {
        repo.mark(&req.video_id).await?;
    }

    Ok(Json(ApiResponse::new(WatchedResponse {
        video_id: req.video_id,
        watched: !req.undo,
    })))
}
