//! Single-video handlers.

use axum::extract::{Path, State};
use axum::Json;

use reel_models::{VideoDoc, VideoId};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// `GET /api/videos/{id}` — fetch a single video record.
pub async fn get_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<VideoDoc>> {
    let id = VideoId::from(video_id);
    let video = state
        .videos
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("video {}", id)))?;

    Ok(Json(video))
}
