//! Application state.

use std::sync::Arc;

use reel_firestore::{
    CommentRepository, FirestoreClient, LikeRepository, UserRepository, VideoRepository,
};
use reel_storage::{MediaFetcher, MediaStore};
use reel_swap::PredictionClient;

use crate::auth::JwksCache;
use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub storage: Arc<MediaStore>,
    pub fetcher: MediaFetcher,
    pub firestore: Arc<FirestoreClient>,
    pub swap: Arc<PredictionClient>,
    pub jwks: Arc<JwksCache>,
    pub videos: VideoRepository,
    pub comments: CommentRepository,
    pub users: UserRepository,
    pub likes: LikeRepository,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let storage = MediaStore::from_env().await?;
        let firestore = FirestoreClient::from_env().await?;
        let swap = PredictionClient::from_env()?;
        let jwks = JwksCache::new().await?;

        let videos = VideoRepository::new(firestore.clone());
        let comments = CommentRepository::new(firestore.clone());
        let users = UserRepository::new(firestore.clone());
        let likes = LikeRepository::new(firestore.clone());

        Ok(Self {
            config,
            storage: Arc::new(storage),
            fetcher: MediaFetcher::new(),
            firestore: Arc::new(firestore),
            swap: Arc::new(swap),
            jwks: Arc::new(jwks),
            videos,
            comments,
            users,
            likes,
        })
    }
}
