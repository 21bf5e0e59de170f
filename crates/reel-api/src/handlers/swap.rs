//! Face swap callable handler.

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use validator::Validate;

use reel_models::VideoDoc;
use reel_swap::SwapInput;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::metrics::{record_swap_completed, record_swap_failed, record_swap_started};
use crate::state::AppState;

/// Face swap request payload.
///
/// Missing fields deserialize to empty strings so they fail validation as
/// invalid-argument rather than as a malformed body.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "sourceVideoUrl is required"))]
    pub source_video_url: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "faceImageUrl is required"))]
    pub face_image_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResponse {
    pub success: bool,
    pub video_id: String,
    pub video_url: String,
    pub status: String,
}

/// `POST /api/swap` — run a face swap end to end.
///
/// Creates a `processing` placeholder before contacting the prediction
/// service so the client sees the video in its feed immediately. Any
/// downstream failure marks the placeholder `failed` (best effort) and
/// surfaces as an internal error.
pub async fn face_swap(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<SwapRequest>,
) -> ApiResult<Json<SwapResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::invalid_argument(e.to_string()))?;

    let placeholder = VideoDoc::swap_placeholder(
        &user.uid,
        &request.source_video_url,
        &request.face_image_url,
    );
    state.videos.create(&placeholder).await?;

    record_swap_started();
    let started = Instant::now();
    info!(
        "Face swap {} started for user {} (source: {})",
        placeholder.id, user.uid, request.source_video_url
    );

    match process_swap(&state, &placeholder).await {
        Ok(video_url) => {
            record_swap_completed(started.elapsed().as_secs_f64());
            info!(
                "Face swap {} completed in {:?}",
                placeholder.id,
                started.elapsed()
            );
            Ok(Json(SwapResponse {
                success: true,
                video_id: placeholder.id.to_string(),
                video_url,
                status: "completed".to_string(),
            }))
        }
        Err(e) => {
            record_swap_failed();
            error!("Face swap {} failed: {}", placeholder.id, e);

            // Best effort: a stuck `processing` record is worse than a
            // failed marking we cannot persist
            if let Err(mark_err) = state
                .videos
                .fail_swap(&placeholder.id, &e.to_string())
                .await
            {
                error!(
                    "Could not mark video {} as failed: {}",
                    placeholder.id, mark_err
                );
            }

            Err(e)
        }
    }
}

/// Run the downstream pipeline: predict, fetch the output, store it, and
/// finalize the record. Returns the signed URL of the stored video.
async fn process_swap(state: &AppState, placeholder: &VideoDoc) -> Result<String, ApiError> {
    let input = SwapInput::new(
        placeholder.face_image_url.clone().unwrap_or_default(),
        placeholder.original_video_url.clone().unwrap_or_default(),
    );

    let output_url = state.swap.run_swap(input).await?;
    let bytes = state.fetcher.fetch_bytes(&output_url).await?;

    let key = format!("face-swaps/{}.mp4", placeholder.id);
    state.storage.upload_bytes(bytes, &key, "video/mp4").await?;
    let signed_url = state.storage.presign_get(&key).await?;

    let thumbnail = placeholder.face_image_url.clone().unwrap_or_default();
    state
        .videos
        .complete_swap(&placeholder.id, &signed_url, &thumbnail)
        .await?;

    Ok(signed_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_urls_fail_validation() {
        let request: SwapRequest = serde_json::from_str("{}").unwrap();
        assert!(request.validate().is_err());

        let request: SwapRequest =
            serde_json::from_str(r#"{"sourceVideoUrl": "https://v/a.mp4"}"#).unwrap();
        assert!(request.validate().is_err());

        let request: SwapRequest = serde_json::from_str(
            r#"{"sourceVideoUrl": "https://v/a.mp4", "faceImageUrl": ""}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_complete_request_validates() {
        let request: SwapRequest = serde_json::from_str(
            r#"{"sourceVideoUrl": "https://v/a.mp4", "faceImageUrl": "https://i/f.jpg"}"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());
    }
}
