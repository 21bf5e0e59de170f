//! User profile handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use reel_firestore::FirestoreError;
use reel_models::{UserProfile, VideoDoc};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub interests: Option<Vec<String>>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// `POST /api/users` — create the caller's profile at registration.
///
/// The document id is the verified uid from the token, never the body.
pub async fn create_user(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<Json<UserProfile>> {
    let email = request
        .email
        .or(user.email)
        .ok_or_else(|| ApiError::invalid_argument("email is required"))?;

    let mut profile = UserProfile::new(&user.uid, email, request.display_name);
    profile.interests = request.interests;
    profile.avatar_url = request.avatar_url;

    match state.users.create(&profile).await {
        Ok(_) => {
            info!("Registered user {}", user.uid);
            Ok(Json(profile))
        }
        Err(FirestoreError::AlreadyExists(_)) => {
            Err(ApiError::invalid_argument("profile already exists"))
        }
        Err(e) => Err(e.into()),
    }
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub user: UserProfile,
    /// The user's videos, newest first
    pub videos: Vec<VideoDoc>,
}

/// `GET /api/users/{id}` — profile plus that user's videos.
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    let user = state
        .users
        .get(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("user {}", user_id)))?;

    let videos = state.videos.list_by_user(&user_id).await?;

    Ok(Json(ProfileResponse { user, videos }))
}
