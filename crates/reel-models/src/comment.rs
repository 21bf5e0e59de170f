//! Comment document model.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::video::VideoId;

/// Comment document stored in the `comments` collection.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CommentDoc {
    /// Document ID
    pub id: String,

    /// Comment text
    pub text: String,

    /// Author user ID
    pub user_id: String,

    /// Parent video ID
    pub video_id: VideoId,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Like counter
    #[serde(default)]
    pub likes_count: i64,
}

impl CommentDoc {
    /// Create a new comment with a fresh id and zero likes.
    pub fn new(video_id: VideoId, user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            user_id: user_id.into(),
            video_id,
            created_at: Utc::now(),
            likes_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_comment_defaults() {
        let c = CommentDoc::new(VideoId::from("v1"), "user1", "nice video");
        assert_eq!(c.video_id.as_str(), "v1");
        assert_eq!(c.likes_count, 0);
        assert!(!c.id.is_empty());
    }
}
