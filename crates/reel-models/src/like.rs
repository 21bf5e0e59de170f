//! Like marker model.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::video::VideoId;

/// Per-video per-user existence marker in the `likes` collection.
///
/// The deterministic document id makes the like toggle idempotent: a like
/// exists iff the marker document exists.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LikeMarker {
    /// Document ID (`{video_id}_{user_id}`)
    pub id: String,

    /// Liked video
    pub video_id: VideoId,

    /// Liking user
    pub user_id: String,

    /// When the like was placed
    pub created_at: DateTime<Utc>,
}

impl LikeMarker {
    /// Deterministic document id for a (video, user) pair.
    pub fn doc_id(video_id: &VideoId, user_id: &str) -> String {
        format!("{}_{}", video_id.as_str(), user_id)
    }

    /// Create a marker for the given pair.
    pub fn new(video_id: VideoId, user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        Self {
            id: Self::doc_id(&video_id, &user_id),
            video_id,
            user_id,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_id_is_deterministic() {
        let v = VideoId::from("vid1");
        assert_eq!(LikeMarker::doc_id(&v, "user1"), "vid1_user1");
        let marker = LikeMarker::new(v, "user1");
        assert_eq!(marker.id, "vid1_user1");
    }
}
