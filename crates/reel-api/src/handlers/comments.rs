//! Comment handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use reel_models::{CommentDoc, VideoId};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const DEFAULT_COMMENT_PAGE: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct CommentsQuery {
    pub limit: Option<u32>,
}

#[derive(Serialize)]
pub struct CommentsResponse {
    pub comments: Vec<CommentDoc>,
}

/// `GET /api/videos/{id}/comments` — comments for a video, newest first.
pub async fn list_comments(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Query(query): Query<CommentsQuery>,
) -> ApiResult<Json<CommentsResponse>> {
    let id = VideoId::from(video_id);
    let limit = query.limit.unwrap_or(DEFAULT_COMMENT_PAGE).clamp(1, 200);

    let comments = state.comments.list_for_video(&id, limit).await?;
    Ok(Json(CommentsResponse { comments }))
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize)]
pub struct CreateCommentResponse {
    pub comment: CommentDoc,
    pub comments_count: i64,
}

/// `POST /api/videos/{id}/comments` — create a comment and bump the video's
/// comment counter.
pub async fn create_comment(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    user: AuthUser,
    Json(request): Json<CreateCommentRequest>,
) -> ApiResult<Json<CreateCommentResponse>> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(ApiError::invalid_argument("Comment text cannot be empty"));
    }

    let id = VideoId::from(video_id);
    if state.videos.get(&id).await?.is_none() {
        return Err(ApiError::not_found(format!("video {}", id)));
    }

    let comment = CommentDoc::new(id.clone(), &user.uid, text);
    state.comments.create(&comment).await?;

    // Counter drift here leaves the comment readable but the count stale
    let comments_count = match state.videos.increment_comments(&id).await {
        Ok(count) => count,
        Err(e) => {
            warn!("Comment counter update failed for video {}: {}", id, e);
            0
        }
    };

    Ok(Json(CreateCommentResponse {
        comment,
        comments_count,
    }))
}

#[derive(Serialize)]
pub struct CommentLikeResponse {
    pub likes_count: i64,
}

/// `POST /api/comments/{id}/like` — increment a comment's like counter.
pub async fn like_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    _user: AuthUser,
) -> ApiResult<Json<CommentLikeResponse>> {
    let likes_count = state
        .comments
        .increment_likes(&comment_id)
        .await
        .map_err(|e| match e {
            reel_firestore::FirestoreError::NotFound(_) => {
                ApiError::not_found(format!("comment {}", comment_id))
            }
            other => other.into(),
        })?;

    Ok(Json(CommentLikeResponse { likes_count }))
}
