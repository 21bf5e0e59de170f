//! S3-compatible media storage client.
//!
//! This crate provides:
//! - Byte upload/download for the media bucket
//! - Presigned URL generation for playback
//! - Fetching generated media from provider URLs

pub mod client;
pub mod error;
pub mod fetch;

pub use client::{MediaStore, MediaStoreConfig, SIGNED_URL_TTL};
pub use error::{StorageError, StorageResult};
pub use fetch::MediaFetcher;
