//! User profile model.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// User profile stored in the `users` collection, keyed by the auth uid.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UserProfile {
    /// Document ID (auth uid)
    pub id: String,

    /// Email address
    pub email: String,

    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Interest tags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,

    /// Avatar image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,

    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Create a profile at registration time.
    pub fn new(id: impl Into<String>, email: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name,
            interests: None,
            avatar_url: None,
            created_at: Utc::now(),
        }
    }
}
