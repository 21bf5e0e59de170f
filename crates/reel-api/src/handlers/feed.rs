//! Feed handlers.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use reel_models::VideoDoc;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Hard cap regardless of the requested page size.
const MAX_PAGE_SIZE: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<u32>,
    /// Creation timestamp of the last video on the previous page (RFC 3339)
    pub cursor: Option<String>,
}

#[derive(Serialize)]
pub struct FeedResponse {
    pub videos: Vec<VideoDoc>,
    /// Pass back as `cursor` to fetch the next page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// `GET /api/feed` — page of videos, newest first.
pub async fn get_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> ApiResult<Json<FeedResponse>> {
    let limit = query
        .limit
        .unwrap_or(state.config.feed_page_size)
        .clamp(1, MAX_PAGE_SIZE);

    let cursor = match query.cursor.as_deref() {
        Some(raw) => Some(parse_cursor(raw)?),
        None => None,
    };

    let videos = state.videos.list_feed(limit, cursor).await?;

    // A short page means the feed is exhausted
    let next_cursor = if videos.len() as u32 == limit {
        videos.last().map(|v| v.created_at.to_rfc3339())
    } else {
        None
    };

    Ok(Json(FeedResponse {
        videos,
        next_cursor,
    }))
}

fn parse_cursor(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ApiError::invalid_argument("cursor must be an RFC 3339 timestamp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cursor() {
        assert!(parse_cursor("2025-06-01T12:00:00Z").is_ok());
        assert!(parse_cursor("2025-06-01T12:00:00+02:00").is_ok());
        assert!(parse_cursor("yesterday").is_err());
        assert!(parse_cursor("").is_err());
    }
}
