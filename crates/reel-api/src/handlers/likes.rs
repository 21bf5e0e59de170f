//! Video like toggle handler.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::debug;

use reel_models::VideoId;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Serialize)]
pub struct LikeResponse {
    /// Whether the caller likes the video after this call
    pub liked: bool,
    pub likes_count: i64,
}

/// `POST /api/videos/{id}/like` — toggle the caller's like.
///
/// The like marker is the source of truth; the counter on the video record
/// follows it.
pub async fn toggle_like(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<LikeResponse>> {
    let id = VideoId::from(video_id);
    if state.videos.get(&id).await?.is_none() {
        return Err(ApiError::not_found(format!("video {}", id)));
    }

    let liked = state.likes.toggle(&id, &user.uid).await?;
    let delta = if liked { 1 } else { -1 };
    let likes_count = state.videos.adjust_likes(&id, delta).await?;

    debug!(
        "User {} {} video {} ({} likes)",
        user.uid,
        if liked { "liked" } else { "unliked" },
        id,
        likes_count
    );

    Ok(Json(LikeResponse { liked, likes_count }))
}
