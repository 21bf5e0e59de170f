//! Token caching for Firestore authentication.
//!
//! Thread-safe, async-aware token cache with a refresh margin, single-flight
//! refresh, and graceful fallback to a still-usable token when refresh fails.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use gcp_auth::TokenProvider;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{FirestoreError, FirestoreResult};

/// Refresh margin: refresh token 60 seconds before expiry.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Conservative token TTL when expiry is unknown. OAuth tokens are typically
/// valid for 60 minutes.
const TOKEN_DEFAULT_TTL: Duration = Duration::from_secs(50 * 60);

/// OAuth scope for Firestore/Datastore access.
pub const FIRESTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

/// Cached token with expiration tracking.
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    /// Still valid with the refresh margin applied.
    fn is_valid(&self) -> bool {
        Instant::now() + TOKEN_REFRESH_MARGIN < self.expires_at
    }

    /// Technically still usable even if a refresh is due.
    fn is_usable(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Thread-safe token cache with single-flight refresh.
pub struct TokenCache {
    auth: Arc<dyn TokenProvider>,
    cache: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    /// Create a new token cache.
    pub fn new(auth: Arc<dyn TokenProvider>) -> Self {
        Self {
            auth,
            cache: RwLock::new(None),
        }
    }

    /// Invalidate the cached token.
    pub async fn invalidate(&self) {
        let mut cache = self.cache.write().await;
        *cache = None;
    }

    /// Get a valid access token, refreshing if necessary.
    pub async fn get_token(&self) -> FirestoreResult<String> {
        // Fast path: read lock only
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let mut cache = self.cache.write().await;

        // Double-check: another task may have refreshed while we waited
        if let Some(cached) = cache.as_ref() {
            if cached.is_valid() {
                return Ok(cached.access_token.clone());
            }
        }

        self.refresh_token(&mut cache).await
    }

    /// Refresh the token, updating the cache.
    async fn refresh_token(&self, cache: &mut Option<CachedToken>) -> FirestoreResult<String> {
        match self.auth.token(&[FIRESTORE_SCOPE]).await {
            Ok(token) => {
                let access_token = token.as_str().to_string();

                // Prefer the real expiry from gcp_auth, fall back to a conservative default.
                let expires_at = {
                    let now = Utc::now();
                    let exp = token.expires_at();

                    if exp > now {
                        match (exp - now).to_std() {
                            Ok(ttl) => Instant::now() + ttl,
                            Err(_) => Instant::now() + TOKEN_DEFAULT_TTL,
                        }
                    } else {
                        // Already-expired tokens force a refresh on the next request.
                        Instant::now()
                    }
                };

                *cache = Some(CachedToken {
                    access_token: access_token.clone(),
                    expires_at,
                });

                debug!("Refreshed Firestore auth token");
                Ok(access_token)
            }
            Err(e) => {
                if let Some(cached) = cache.as_ref() {
                    if cached.is_usable() {
                        warn!("Token refresh failed, using existing token: {}", e);
                        return Ok(cached.access_token.clone());
                    }
                }

                Err(FirestoreError::auth_error(format!(
                    "Failed to obtain auth token: {}",
                    e
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_margin_below_default_ttl() {
        assert!(TOKEN_REFRESH_MARGIN < TOKEN_DEFAULT_TTL);
    }

    #[test]
    fn test_firestore_scope() {
        assert!(FIRESTORE_SCOPE.contains("datastore"));
    }
}
