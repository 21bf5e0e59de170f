//! Shared data models for the Reel backend.
//!
//! This crate provides Serde-serializable types for:
//! - Video documents (uploads and AI-generated face swaps)
//! - Comments, likes, and user profiles
//! - Document-id derivation from storage object paths
//! - Display formatting for counters

pub mod comment;
pub mod format;
pub mod like;
pub mod object_path;
pub mod user;
pub mod video;

// Re-export common types
pub use comment::CommentDoc;
pub use format::format_count;
pub use like::LikeMarker;
pub use object_path::{is_mp4_content_type, video_doc_id};
pub use user::UserProfile;
pub use video::{GenerationStatus, VideoDoc, VideoId};
