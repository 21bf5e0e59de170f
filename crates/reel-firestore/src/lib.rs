//! Firestore REST API client.
//!
//! This crate provides:
//! - Typed repositories for videos, comments, likes, and users
//! - Service account authentication via gcp_auth
//! - Merge updates, conditional counter updates, and retry logic

pub mod client;
pub mod error;
pub mod metrics;
pub mod repos;
pub mod retry;
pub mod token_cache;
pub mod types;

pub use client::{FirestoreClient, FirestoreConfig};
pub use error::{FirestoreError, FirestoreResult};
pub use repos::{CommentRepository, LikeRepository, UserRepository, VideoRepository};
pub use types::{Document, FromFirestoreValue, ToFirestoreValue, Value};
