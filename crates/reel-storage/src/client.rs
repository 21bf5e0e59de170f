//! S3-compatible media store.

use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Longest expiry the S3 presign API accepts.
pub const SIGNED_URL_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Configuration for the media store.
#[derive(Debug, Clone)]
pub struct MediaStoreConfig {
    /// S3 API endpoint URL
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// Region ("auto" for R2-style providers)
    pub region: String,
}

impl MediaStoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: std::env::var("MEDIA_ENDPOINT_URL")
                .map_err(|_| StorageError::config_error("MEDIA_ENDPOINT_URL not set"))?,
            access_key_id: std::env::var("MEDIA_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config_error("MEDIA_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("MEDIA_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("MEDIA_SECRET_ACCESS_KEY not set"))?,
            bucket_name: std::env::var("MEDIA_BUCKET_NAME")
                .map_err(|_| StorageError::config_error("MEDIA_BUCKET_NAME not set"))?,
            region: std::env::var("MEDIA_REGION").unwrap_or_else(|_| "auto".to_string()),
        })
    }
}

/// Client for the media bucket holding uploads and generated videos.
#[derive(Clone)]
pub struct MediaStore {
    client: Client,
    bucket: String,
}

impl MediaStore {
    /// Create a new media store from configuration.
    pub async fn new(config: MediaStoreConfig) -> StorageResult<Self> {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "media",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        let client = Client::from_conf(sdk_config);

        Ok(Self {
            client,
            bucket: config.bucket_name,
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        let config = MediaStoreConfig::from_env()?;
        Self::new(config).await
    }

    /// Upload bytes to the bucket.
    pub async fn upload_bytes(
        &self,
        data: Vec<u8>,
        key: &str,
        content_type: &str,
    ) -> StorageResult<()> {
        debug!("Uploading {} bytes to {}", data.len(), key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        info!("Uploaded {}", key);
        Ok(())
    }

    /// Download object as bytes.
    pub async fn download_bytes(&self, key: &str) -> StorageResult<Vec<u8>> {
        debug!("Downloading {}", key);

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.to_string().contains("NoSuchKey") {
                    StorageError::not_found(key)
                } else {
                    StorageError::DownloadFailed(e.to_string())
                }
            })?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?
            .into_bytes()
            .to_vec();

        Ok(bytes)
    }

    /// Generate a presigned URL for GET with the maximum allowed expiry.
    pub async fn presign_get(&self, key: &str) -> StorageResult<String> {
        self.presign_get_with_ttl(key, SIGNED_URL_TTL).await
    }

    /// Generate a presigned URL for GET with an explicit expiry.
    pub async fn presign_get_with_ttl(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let presign_config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }

    /// Check if an object exists.
    pub async fn exists(&self, key: &str) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                if e.to_string().contains("NotFound") || e.to_string().contains("NoSuchKey") {
                    Ok(false)
                } else {
                    Err(StorageError::AwsSdk(e.to_string()))
                }
            }
        }
    }

    /// Check connectivity by performing a head bucket operation.
    pub async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::AwsSdk(format!("Bucket connectivity check failed: {}", e)))?;
        Ok(())
    }
}
