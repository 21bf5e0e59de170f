//! Video document models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a video document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Generate a new random video ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Status of an AI face-swap generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    /// Generation in flight
    #[default]
    Processing,
    /// Final video uploaded and linked
    Completed,
    /// Generation failed
    Failed,
}

impl GenerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStatus::Processing => "processing",
            GenerationStatus::Completed => "completed",
            GenerationStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Video document stored in the `videos` collection.
///
/// Plain uploads are created by the storage trigger with merge semantics;
/// AI-generated videos start as a `processing` placeholder created by the
/// face-swap handler and are updated on completion or failure.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoDoc {
    /// Document ID
    pub id: VideoId,

    /// Owning user (absent for trigger-created uploads)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Video title
    pub title: String,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Signed media URL (absent while a face swap is processing)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,

    /// Thumbnail URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    /// Categories
    #[serde(default)]
    pub category: Vec<String>,

    /// Like counter
    #[serde(default)]
    pub likes_count: i64,

    /// Comment counter
    #[serde(default)]
    pub comments_count: i64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Whether this video was AI-generated
    #[serde(default)]
    pub is_ai_generated: bool,

    /// Face-swap status (AI-generated videos only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<GenerationStatus>,

    /// Source video the face swap was applied to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_video_url: Option<String>,

    /// Face image used for the swap
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_image_url: Option<String>,

    /// Error message (if generation failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Completion timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl VideoDoc {
    /// Record for a plain upload, keyed by the id derived from the object path.
    pub fn from_upload(id: VideoId, video_url: impl Into<String>) -> Self {
        let title = id.as_str().to_string();
        Self {
            id,
            user_id: None,
            title,
            description: None,
            video_url: Some(video_url.into()),
            thumbnail_url: None,
            category: vec!["Default".to_string()],
            likes_count: 0,
            comments_count: 0,
            created_at: Utc::now(),
            is_ai_generated: false,
            status: None,
            original_video_url: None,
            face_image_url: None,
            error_message: None,
            completed_at: None,
        }
    }

    /// Placeholder record for a face swap in flight.
    pub fn swap_placeholder(
        user_id: impl Into<String>,
        source_video_url: impl Into<String>,
        face_image_url: impl Into<String>,
    ) -> Self {
        Self {
            id: VideoId::new(),
            user_id: Some(user_id.into()),
            title: "Face Swap Video".to_string(),
            description: Some("AI-generated face swap video".to_string()),
            video_url: None,
            thumbnail_url: None,
            category: vec!["AI Generated".to_string()],
            likes_count: 0,
            comments_count: 0,
            created_at: Utc::now(),
            is_ai_generated: true,
            status: Some(GenerationStatus::Processing),
            original_video_url: Some(source_video_url.into()),
            face_image_url: Some(face_image_url.into()),
            error_message: None,
            completed_at: None,
        }
    }

    /// Mark the swap as completed with the final media URL.
    pub fn complete(mut self, video_url: impl Into<String>) -> Self {
        self.status = Some(GenerationStatus::Completed);
        self.video_url = Some(video_url.into());
        self.thumbnail_url = self.face_image_url.clone();
        self.completed_at = Some(Utc::now());
        self
    }

    /// Mark the swap as failed with the remote-reported reason.
    pub fn fail(mut self, error: impl Into<String>) -> Self {
        self.status = Some(GenerationStatus::Failed);
        self.error_message = Some(error.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_id_generation() {
        let id1 = VideoId::new();
        let id2 = VideoId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_upload_doc_defaults() {
        let doc = VideoDoc::from_upload(VideoId::from("clip42"), "https://signed.example/clip42");
        assert_eq!(doc.title, "clip42");
        assert_eq!(doc.category, vec!["Default".to_string()]);
        assert_eq!(doc.likes_count, 0);
        assert_eq!(doc.comments_count, 0);
        assert!(!doc.is_ai_generated);
        assert!(doc.status.is_none());
    }

    #[test]
    fn test_swap_placeholder_starts_processing() {
        let doc = VideoDoc::swap_placeholder("user1", "https://v.example/a.mp4", "https://i.example/f.jpg");
        assert_eq!(doc.status, Some(GenerationStatus::Processing));
        assert!(doc.is_ai_generated);
        assert!(doc.video_url.is_none());
        assert_eq!(doc.user_id.as_deref(), Some("user1"));
    }

    #[test]
    fn test_swap_completion_sets_thumbnail_from_face_image() {
        let doc = VideoDoc::swap_placeholder("user1", "https://v.example/a.mp4", "https://i.example/f.jpg")
            .complete("https://signed.example/out.mp4");
        assert_eq!(doc.status, Some(GenerationStatus::Completed));
        assert_eq!(doc.video_url.as_deref(), Some("https://signed.example/out.mp4"));
        assert_eq!(doc.thumbnail_url.as_deref(), Some("https://i.example/f.jpg"));
        assert!(doc.completed_at.is_some());
    }

    #[test]
    fn test_swap_failure_keeps_processing_fields() {
        let doc = VideoDoc::swap_placeholder("user1", "https://v.example/a.mp4", "https://i.example/f.jpg")
            .fail("face not detected");
        assert_eq!(doc.status, Some(GenerationStatus::Failed));
        assert_eq!(doc.error_message.as_deref(), Some("face not detected"));
        assert!(doc.video_url.is_none());
    }

    #[test]
    fn test_generation_status_serde_snake_case() {
        let json = serde_json::to_string(&GenerationStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
    }
}
