//! Storage object event handler (upload pipeline trigger).

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use reel_models::{is_mp4_content_type, video_doc_id, VideoDoc, VideoId};

use crate::error::ApiResult;
use crate::metrics::record_upload_event;
use crate::state::AppState;

/// A finalized storage object notification.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageObjectEvent {
    /// Object path within the bucket
    pub name: Option<String>,
    /// Bucket the object was written to
    pub bucket: Option<String>,
    /// MIME type of the object
    pub content_type: Option<String>,
}

#[derive(Serialize)]
pub struct UploadEventResponse {
    pub processed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
}

impl UploadEventResponse {
    fn skipped() -> Self {
        Self {
            processed: false,
            video_id: None,
        }
    }
}

/// Decision on an incoming storage event, made before any write.
#[derive(Debug, PartialEq)]
enum EventDisposition {
    /// Well-formed mp4 upload: register it under this document id.
    Process(VideoId),
    /// Valid but irrelevant (non-mp4); acknowledged without a write.
    Ignore(&'static str),
    /// Malformed; acknowledged without a write.
    Drop(&'static str),
}

/// Vet a storage event. Only `Process` leads to signing and a database
/// write; everything else is acknowledged as-is so the sender does not
/// redeliver.
fn classify_event(event: &StorageObjectEvent) -> EventDisposition {
    let name = match event.name.as_deref() {
        Some(n) if !n.is_empty() => n,
        _ => return EventDisposition::Drop("missing object name"),
    };

    let content_type = event.content_type.as_deref().unwrap_or("");
    if !is_mp4_content_type(content_type) {
        return EventDisposition::Ignore("not an mp4 video");
    }

    if event.bucket.as_deref().map_or(true, |b| b.is_empty()) {
        return EventDisposition::Drop("missing bucket");
    }

    match video_doc_id(name) {
        Some(id) => EventDisposition::Process(VideoId::from(id)),
        None => EventDisposition::Drop("empty document id"),
    }
}

/// Handle a finalized upload: derive the document id from the object path,
/// sign a read URL, and merge a video record.
pub async fn handle_storage_event(
    State(state): State<AppState>,
    Json(event): Json<StorageObjectEvent>,
) -> ApiResult<Json<UploadEventResponse>> {
    let video_id = match classify_event(&event) {
        EventDisposition::Process(id) => id,
        EventDisposition::Ignore(reason) => {
            info!("Ignoring storage event ({}): {:?}", reason, event.name);
            record_upload_event("ignored");
            return Ok(Json(UploadEventResponse::skipped()));
        }
        EventDisposition::Drop(reason) => {
            warn!("Dropping malformed storage event ({}): {:?}", reason, event.name);
            record_upload_event("dropped");
            return Ok(Json(UploadEventResponse::skipped()));
        }
    };

    // Classification guaranteed a non-empty name
    let name = event.name.as_deref().unwrap_or_default();
    let signed_url = state.storage.presign_get(name).await?;

    let video = VideoDoc::from_upload(video_id.clone(), signed_url);
    if let Err(e) = state.videos.upsert_merged(&video).await {
        // The signed URL has no compensating action; surface the failure
        error!("Failed to merge video record {}: {}", video_id, e);
        return Err(e.into());
    }

    record_upload_event("merged");
    info!("Upload {} registered as video {}", name, video_id);

    Ok(Json(UploadEventResponse {
        processed: true,
        video_id: Some(video_id.to_string()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: Option<&str>, bucket: Option<&str>, content_type: Option<&str>) -> StorageObjectEvent {
        StorageObjectEvent {
            name: name.map(String::from),
            bucket: bucket.map(String::from),
            content_type: content_type.map(String::from),
        }
    }

    #[test]
    fn test_valid_upload_is_processed() {
        let e = event(Some("uploads/clip.mp4"), Some("media"), Some("video/mp4"));
        assert_eq!(
            classify_event(&e),
            EventDisposition::Process(VideoId::from("clip"))
        );
    }

    #[test]
    fn test_non_mp4_is_ignored_without_write() {
        let e = event(Some("uploads/pic.jpg"), Some("media"), Some("image/jpeg"));
        assert!(matches!(classify_event(&e), EventDisposition::Ignore(_)));

        let e = event(Some("uploads/clip.mp4"), Some("media"), None);
        assert!(matches!(classify_event(&e), EventDisposition::Ignore(_)));
    }

    #[test]
    fn test_missing_name_is_dropped() {
        let e = event(None, Some("media"), Some("video/mp4"));
        assert!(matches!(classify_event(&e), EventDisposition::Drop(_)));

        let e = event(Some(""), Some("media"), Some("video/mp4"));
        assert!(matches!(classify_event(&e), EventDisposition::Drop(_)));
    }

    #[test]
    fn test_missing_bucket_is_dropped() {
        let e = event(Some("uploads/clip.mp4"), None, Some("video/mp4"));
        assert!(matches!(classify_event(&e), EventDisposition::Drop(_)));

        let e = event(Some("uploads/clip.mp4"), Some(""), Some("video/mp4"));
        assert!(matches!(classify_event(&e), EventDisposition::Drop(_)));
    }

    #[test]
    fn test_extensionless_dot_name_is_dropped() {
        let e = event(Some("uploads/.mp4"), Some("media"), Some("video/mp4"));
        assert!(matches!(classify_event(&e), EventDisposition::Drop(_)));
    }

    #[test]
    fn test_multibyte_name_is_processed() {
        let e = event(Some("uploads/€€"), Some("media"), Some("video/mp4"));
        assert_eq!(
            classify_event(&e),
            EventDisposition::Process(VideoId::from("€€"))
        );
    }

    #[test]
    fn test_event_wire_format_is_camel_case() {
        let event: StorageObjectEvent = serde_json::from_str(
            r#"{"name": "uploads/clip.mp4", "bucket": "media", "contentType": "video/mp4"}"#,
        )
        .unwrap();
        assert_eq!(event.name.as_deref(), Some("uploads/clip.mp4"));
        assert_eq!(event.content_type.as_deref(), Some("video/mp4"));
    }

    #[test]
    fn test_event_fields_are_optional() {
        let event: StorageObjectEvent = serde_json::from_str("{}").unwrap();
        assert!(event.name.is_none());
        assert!(event.bucket.is_none());
        assert!(event.content_type.is_none());
    }
}
