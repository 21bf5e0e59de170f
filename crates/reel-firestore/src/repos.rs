//! Typed repositories for the video, comment, user, and like collections.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use reel_models::{CommentDoc, GenerationStatus, LikeMarker, UserProfile, VideoDoc, VideoId};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{Document, StructuredQuery, ToFirestoreValue, Value};

/// Collection names.
pub const VIDEOS: &str = "videos";
pub const COMMENTS: &str = "comments";
pub const USERS: &str = "users";
pub const LIKES: &str = "likes";

/// Maximum retries for optimistic counter updates.
const MAX_COUNTER_RETRIES: u32 = 5;

// ============================================================================
// Videos
// ============================================================================

/// Repository for video documents.
#[derive(Clone)]
pub struct VideoRepository {
    client: FirestoreClient,
}

impl VideoRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Get a video by ID.
    pub async fn get(&self, video_id: &VideoId) -> FirestoreResult<Option<VideoDoc>> {
        let doc = self
            .client
            .with_retry("videos_get", || {
                self.client.get_document(VIDEOS, video_id.as_str())
            })
            .await?;
        match doc {
            Some(d) => Ok(Some(document_to_video(&d)?)),
            None => Ok(None),
        }
    }

    /// Merge an upload record into the collection.
    ///
    /// Patch with an update mask creates the document when absent and
    /// overwrites only the masked fields when present, which makes repeated
    /// delivery of the same storage event idempotent.
    pub async fn upsert_merged(&self, video: &VideoDoc) -> FirestoreResult<()> {
        let fields = video_to_fields(video);
        let mask: Vec<String> = fields.keys().cloned().collect();
        // Idempotent merge, so transient failures are safe to retry
        self.client
            .with_retry("videos_upsert", || {
                self.client.patch_document(
                    VIDEOS,
                    video.id.as_str(),
                    fields.clone(),
                    Some(mask.clone()),
                    None,
                )
            })
            .await?;
        info!("Merged video record: {}", video.id);
        Ok(())
    }

    /// Create a new video record. Fails if the id is taken.
    pub async fn create(&self, video: &VideoDoc) -> FirestoreResult<()> {
        let fields = video_to_fields(video);
        self.client
            .create_document(VIDEOS, video.id.as_str(), fields)
            .await?;
        info!("Created video record: {}", video.id);
        Ok(())
    }

    /// Mark a face swap as completed with its final media URL.
    pub async fn complete_swap(
        &self,
        video_id: &VideoId,
        video_url: &str,
        thumbnail_url: &str,
    ) -> FirestoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert(
            "status".to_string(),
            GenerationStatus::Completed.as_str().to_firestore_value(),
        );
        fields.insert("video_url".to_string(), video_url.to_firestore_value());
        fields.insert("thumbnail_url".to_string(), thumbnail_url.to_firestore_value());
        fields.insert("completed_at".to_string(), Utc::now().to_firestore_value());

        self.client
            .patch_document(
                VIDEOS,
                video_id.as_str(),
                fields,
                Some(vec![
                    "status".to_string(),
                    "video_url".to_string(),
                    "thumbnail_url".to_string(),
                    "completed_at".to_string(),
                ]),
                None,
            )
            .await?;
        Ok(())
    }

    /// Mark a face swap as failed with the remote-reported reason.
    pub async fn fail_swap(&self, video_id: &VideoId, error: &str) -> FirestoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert(
            "status".to_string(),
            GenerationStatus::Failed.as_str().to_firestore_value(),
        );
        fields.insert("error_message".to_string(), error.to_firestore_value());

        self.client
            .patch_document(
                VIDEOS,
                video_id.as_str(),
                fields,
                Some(vec!["status".to_string(), "error_message".to_string()]),
                None,
            )
            .await?;
        Ok(())
    }

    /// Adjust the like counter by a signed delta. Returns the new count.
    pub async fn adjust_likes(&self, video_id: &VideoId, delta: i64) -> FirestoreResult<i64> {
        adjust_counter(&self.client, VIDEOS, video_id.as_str(), "likes_count", delta).await
    }

    /// Increment the comment counter. Returns the new count.
    pub async fn increment_comments(&self, video_id: &VideoId) -> FirestoreResult<i64> {
        adjust_counter(&self.client, VIDEOS, video_id.as_str(), "comments_count", 1).await
    }

    /// Page of the feed, newest first.
    ///
    /// `cursor` is the creation timestamp of the last video on the previous
    /// page; results resume strictly after it.
    pub async fn list_feed(
        &self,
        limit: u32,
        cursor: Option<DateTime<Utc>>,
    ) -> FirestoreResult<Vec<VideoDoc>> {
        let mut query = StructuredQuery::collection(VIDEOS)
            .order_desc("created_at")
            .with_limit(limit);
        if let Some(ts) = cursor {
            query = query.start_after(vec![ts.to_firestore_value()]);
        }

        let docs = self
            .client
            .with_retry("videos_feed", || self.client.run_query(query.clone()))
            .await?;
        docs.iter().map(document_to_video).collect()
    }

    /// A user's videos, newest first.
    pub async fn list_by_user(&self, user_id: &str) -> FirestoreResult<Vec<VideoDoc>> {
        let query = StructuredQuery::collection(VIDEOS)
            .where_eq("user_id", user_id.to_firestore_value())
            .order_desc("created_at");

        let docs = self
            .client
            .with_retry("videos_by_user", || self.client.run_query(query.clone()))
            .await?;
        docs.iter().map(document_to_video).collect()
    }
}

// ============================================================================
// Comments
// ============================================================================

/// Repository for comment documents.
#[derive(Clone)]
pub struct CommentRepository {
    client: FirestoreClient,
}

impl CommentRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Create a comment.
    pub async fn create(&self, comment: &CommentDoc) -> FirestoreResult<()> {
        let fields = comment_to_fields(comment);
        self.client.create_document(COMMENTS, &comment.id, fields).await?;
        debug!("Created comment {} on video {}", comment.id, comment.video_id);
        Ok(())
    }

    /// Comments for a video, newest first.
    pub async fn list_for_video(
        &self,
        video_id: &VideoId,
        limit: u32,
    ) -> FirestoreResult<Vec<CommentDoc>> {
        let query = StructuredQuery::collection(COMMENTS)
            .where_eq("video_id", video_id.as_str().to_firestore_value())
            .order_desc("created_at")
            .with_limit(limit);

        let docs = self
            .client
            .with_retry("comments_list", || self.client.run_query(query.clone()))
            .await?;
        docs.iter().map(document_to_comment).collect()
    }

    /// Increment a comment's like counter. Returns the new count.
    pub async fn increment_likes(&self, comment_id: &str) -> FirestoreResult<i64> {
        adjust_counter(&self.client, COMMENTS, comment_id, "likes_count", 1).await
    }
}

// ============================================================================
// Users
// ============================================================================

/// Repository for user profiles.
#[derive(Clone)]
pub struct UserRepository {
    client: FirestoreClient,
}

impl UserRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Create a profile at registration.
    pub async fn create(&self, profile: &UserProfile) -> FirestoreResult<()> {
        let fields = user_to_fields(profile);
        self.client.create_document(USERS, &profile.id, fields).await?;
        info!("Created user profile: {}", profile.id);
        Ok(())
    }

    /// Get a profile by uid.
    pub async fn get(&self, user_id: &str) -> FirestoreResult<Option<UserProfile>> {
        let doc = self
            .client
            .with_retry("users_get", || self.client.get_document(USERS, user_id))
            .await?;
        match doc {
            Some(d) => Ok(Some(document_to_user(&d)?)),
            None => Ok(None),
        }
    }
}

// ============================================================================
// Likes
// ============================================================================

/// Repository for like markers.
#[derive(Clone)]
pub struct LikeRepository {
    client: FirestoreClient,
}

impl LikeRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Whether the user has liked the video.
    pub async fn exists(&self, video_id: &VideoId, user_id: &str) -> FirestoreResult<bool> {
        let doc_id = LikeMarker::doc_id(video_id, user_id);
        let doc = self
            .client
            .with_retry("likes_get", || self.client.get_document(LIKES, &doc_id))
            .await?;
        Ok(doc.is_some())
    }

    /// Toggle the like marker for a (video, user) pair.
    ///
    /// Returns `true` when the video is liked after the call. The marker's
    /// deterministic id deduplicates concurrent toggles: a duplicate create
    /// surfaces as AlreadyExists and is treated as already-liked.
    pub async fn toggle(&self, video_id: &VideoId, user_id: &str) -> FirestoreResult<bool> {
        let doc_id = LikeMarker::doc_id(video_id, user_id);

        if self.client.get_document(LIKES, &doc_id).await?.is_some() {
            self.client.delete_document(LIKES, &doc_id).await?;
            return Ok(false);
        }

        let marker = LikeMarker::new(video_id.clone(), user_id);
        match self.client.create_document(LIKES, &doc_id, like_to_fields(&marker)).await {
            Ok(_) => Ok(true),
            Err(FirestoreError::AlreadyExists(_)) => {
                debug!("Like {} already present, treating toggle as no-op", doc_id);
                Ok(true)
            }
            Err(e) => Err(e),
        }
    }
}

// ============================================================================
// Counter Updates
// ============================================================================

/// Adjust an integer counter field with optimistic concurrency control.
///
/// Reads the document, applies the delta (clamped at zero), and patches with
/// an update-time precondition; a failed precondition means a concurrent
/// writer won, so the read-modify-write is retried.
async fn adjust_counter(
    client: &FirestoreClient,
    collection: &str,
    doc_id: &str,
    field: &str,
    delta: i64,
) -> FirestoreResult<i64> {
    let mut last_error = None;

    for attempt in 0..MAX_COUNTER_RETRIES {
        let doc = client
            .with_retry("counter_read", || client.get_document(collection, doc_id))
            .await?
            .ok_or_else(|| FirestoreError::not_found(format!("{}/{}", collection, doc_id)))?;

        let current: i64 = doc.get(field).unwrap_or(0);
        let new_count = (current + delta).max(0);

        let mut fields = HashMap::new();
        fields.insert(field.to_string(), new_count.to_firestore_value());

        match client
            .patch_document(
                collection,
                doc_id,
                fields,
                Some(vec![field.to_string()]),
                doc.update_time.as_deref(),
            )
            .await
        {
            Ok(_) => return Ok(new_count),
            Err(e) if e.is_precondition_failed() => {
                debug!(
                    "Counter update precondition failed for {}/{} (attempt {}), retrying",
                    collection,
                    doc_id,
                    attempt + 1
                );
                last_error = Some(e);
                tokio::time::sleep(std::time::Duration::from_millis(50 * (attempt as u64 + 1)))
                    .await;
            }
            Err(e) => return Err(e),
        }
    }

    warn!(
        "Counter update failed after {} retries for {}/{}: {:?}",
        MAX_COUNTER_RETRIES, collection, doc_id, last_error
    );
    Err(FirestoreError::request_failed(format!(
        "Failed to update {} after {} retries",
        field, MAX_COUNTER_RETRIES
    )))
}

// ============================================================================
// Field Mapping
// ============================================================================

fn video_to_fields(video: &VideoDoc) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("title".to_string(), video.title.to_firestore_value());
    fields.insert("category".to_string(), video.category.to_firestore_value());
    fields.insert("likes_count".to_string(), video.likes_count.to_firestore_value());
    fields.insert("comments_count".to_string(), video.comments_count.to_firestore_value());
    fields.insert("created_at".to_string(), video.created_at.to_firestore_value());
    fields.insert("is_ai_generated".to_string(), video.is_ai_generated.to_firestore_value());

    if let Some(ref user_id) = video.user_id {
        fields.insert("user_id".to_string(), user_id.to_firestore_value());
    }
    if let Some(ref description) = video.description {
        fields.insert("description".to_string(), description.to_firestore_value());
    }
    if let Some(ref url) = video.video_url {
        fields.insert("video_url".to_string(), url.to_firestore_value());
    }
    if let Some(ref url) = video.thumbnail_url {
        fields.insert("thumbnail_url".to_string(), url.to_firestore_value());
    }
    if let Some(status) = video.status {
        fields.insert("status".to_string(), status.as_str().to_firestore_value());
    }
    if let Some(ref url) = video.original_video_url {
        fields.insert("original_video_url".to_string(), url.to_firestore_value());
    }
    if let Some(ref url) = video.face_image_url {
        fields.insert("face_image_url".to_string(), url.to_firestore_value());
    }
    if let Some(ref msg) = video.error_message {
        fields.insert("error_message".to_string(), msg.to_firestore_value());
    }
    if let Some(ts) = video.completed_at {
        fields.insert("completed_at".to_string(), ts.to_firestore_value());
    }

    fields
}

fn parse_status(s: &str) -> Option<GenerationStatus> {
    match s {
        "processing" => Some(GenerationStatus::Processing),
        "completed" => Some(GenerationStatus::Completed),
        "failed" => Some(GenerationStatus::Failed),
        _ => None,
    }
}

fn document_to_video(doc: &Document) -> FirestoreResult<VideoDoc> {
    let id = doc
        .doc_id()
        .ok_or_else(|| FirestoreError::InvalidResponse("video document without name".into()))?;

    Ok(VideoDoc {
        id: VideoId::from(id),
        user_id: doc.get("user_id"),
        title: doc.get("title").unwrap_or_default(),
        description: doc.get("description"),
        video_url: doc.get("video_url"),
        thumbnail_url: doc.get("thumbnail_url"),
        category: doc.get("category").unwrap_or_default(),
        likes_count: doc.get("likes_count").unwrap_or(0),
        comments_count: doc.get("comments_count").unwrap_or(0),
        created_at: doc.get("created_at").unwrap_or_else(Utc::now),
        is_ai_generated: doc.get("is_ai_generated").unwrap_or(false),
        status: doc.get::<String>("status").as_deref().and_then(parse_status),
        original_video_url: doc.get("original_video_url"),
        face_image_url: doc.get("face_image_url"),
        error_message: doc.get("error_message"),
        completed_at: doc.get("completed_at"),
    })
}

fn comment_to_fields(comment: &CommentDoc) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("text".to_string(), comment.text.to_firestore_value());
    fields.insert("user_id".to_string(), comment.user_id.to_firestore_value());
    fields.insert(
        "video_id".to_string(),
        comment.video_id.as_str().to_firestore_value(),
    );
    fields.insert("created_at".to_string(), comment.created_at.to_firestore_value());
    fields.insert("likes_count".to_string(), comment.likes_count.to_firestore_value());
    fields
}

fn document_to_comment(doc: &Document) -> FirestoreResult<CommentDoc> {
    let id = doc
        .doc_id()
        .ok_or_else(|| FirestoreError::InvalidResponse("comment document without name".into()))?;

    Ok(CommentDoc {
        id: id.to_string(),
        text: doc.get("text").unwrap_or_default(),
        user_id: doc.get("user_id").unwrap_or_default(),
        video_id: VideoId::from(doc.get::<String>("video_id").unwrap_or_default()),
        created_at: doc.get("created_at").unwrap_or_else(Utc::now),
        likes_count: doc.get("likes_count").unwrap_or(0),
    })
}

fn user_to_fields(profile: &UserProfile) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("email".to_string(), profile.email.to_firestore_value());
    fields.insert("created_at".to_string(), profile.created_at.to_firestore_value());

    if let Some(ref name) = profile.display_name {
        fields.insert("display_name".to_string(), name.to_firestore_value());
    }
    if let Some(ref interests) = profile.interests {
        fields.insert("interests".to_string(), interests.to_firestore_value());
    }
    if let Some(ref url) = profile.avatar_url {
        fields.insert("avatar_url".to_string(), url.to_firestore_value());
    }

    fields
}

fn document_to_user(doc: &Document) -> FirestoreResult<UserProfile> {
    let id = doc
        .doc_id()
        .ok_or_else(|| FirestoreError::InvalidResponse("user document without name".into()))?;

    Ok(UserProfile {
        id: id.to_string(),
        email: doc.get("email").unwrap_or_default(),
        display_name: doc.get("display_name"),
        interests: doc.get("interests"),
        avatar_url: doc.get("avatar_url"),
        created_at: doc.get("created_at").unwrap_or_else(Utc::now),
    })
}

fn like_to_fields(marker: &LikeMarker) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert(
        "video_id".to_string(),
        marker.video_id.as_str().to_firestore_value(),
    );
    fields.insert("user_id".to_string(), marker.user_id.to_firestore_value());
    fields.insert("created_at".to_string(), marker.created_at.to_firestore_value());
    fields
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(name: &str, fields: HashMap<String, Value>) -> Document {
        Document {
            name: Some(format!(
                "projects/p/databases/(default)/documents/{}",
                name
            )),
            fields: Some(fields),
            create_time: None,
            update_time: Some("2025-01-01T00:00:00Z".to_string()),
        }
    }

    #[test]
    fn test_video_field_roundtrip() {
        let video = VideoDoc::swap_placeholder("user1", "https://v/a.mp4", "https://i/f.jpg");
        let fields = video_to_fields(&video);
        let doc = doc_with(&format!("videos/{}", video.id), fields);
        let back = document_to_video(&doc).unwrap();

        assert_eq!(back.id, video.id);
        assert_eq!(back.user_id, video.user_id);
        assert_eq!(back.status, Some(GenerationStatus::Processing));
        assert_eq!(back.original_video_url.as_deref(), Some("https://v/a.mp4"));
        assert!(back.is_ai_generated);
    }

    #[test]
    fn test_upload_video_fields_omit_ai_extras() {
        let video = VideoDoc::from_upload(VideoId::from("clip1"), "https://signed/clip1");
        let fields = video_to_fields(&video);

        assert!(fields.contains_key("video_url"));
        assert!(fields.contains_key("created_at"));
        assert!(!fields.contains_key("status"));
        assert!(!fields.contains_key("face_image_url"));
        assert!(!fields.contains_key("user_id"));
    }

    #[test]
    fn test_video_from_sparse_document() {
        // Records written by older clients may miss counters entirely
        let mut fields = HashMap::new();
        fields.insert("title".to_string(), "old".to_firestore_value());
        let doc = doc_with("videos/old1", fields);
        let video = document_to_video(&doc).unwrap();

        assert_eq!(video.id.as_str(), "old1");
        assert_eq!(video.likes_count, 0);
        assert_eq!(video.comments_count, 0);
        assert!(video.status.is_none());
    }

    #[test]
    fn test_comment_field_roundtrip() {
        let comment = CommentDoc::new(VideoId::from("v1"), "user1", "great");
        let fields = comment_to_fields(&comment);
        let doc = doc_with(&format!("comments/{}", comment.id), fields);
        let back = document_to_comment(&doc).unwrap();

        assert_eq!(back.id, comment.id);
        assert_eq!(back.text, "great");
        assert_eq!(back.video_id.as_str(), "v1");
    }

    #[test]
    fn test_user_field_roundtrip() {
        let profile = UserProfile::new("uid1", "a@b.c", Some("Alice".to_string()));
        let fields = user_to_fields(&profile);
        let doc = doc_with("users/uid1", fields);
        let back = document_to_user(&doc).unwrap();

        assert_eq!(back.id, "uid1");
        assert_eq!(back.email, "a@b.c");
        assert_eq!(back.display_name.as_deref(), Some("Alice"));
        assert!(back.interests.is_none());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(parse_status("processing"), Some(GenerationStatus::Processing));
        assert_eq!(parse_status("completed"), Some(GenerationStatus::Completed));
        assert_eq!(parse_status("failed"), Some(GenerationStatus::Failed));
        assert_eq!(parse_status("unknown"), None);
    }
}
