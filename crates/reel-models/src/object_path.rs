//! Document-id derivation from storage object paths.

/// Derive a video document id from a storage object path.
///
/// Strips any directory components and a trailing `.mp4` extension
/// (case-insensitive). Returns `None` when the result is empty, e.g. for
/// paths like `"uploads/.mp4"`.
///
/// # Examples
/// ```
/// use reel_models::object_path::video_doc_id;
/// assert_eq!(video_doc_id("a/b/c.MP4").as_deref(), Some("c"));
/// assert_eq!(video_doc_id("clip.mp4").as_deref(), Some("clip"));
/// assert_eq!(video_doc_id("a/.mp4"), None);
/// ```
pub fn video_doc_id(path: &str) -> Option<String> {
    let file_name = path.rsplit('/').next().unwrap_or(path);

    // Compare the suffix on bytes: names may end mid-character in UTF-8,
    // and a matching ".mp4" suffix guarantees an ASCII slice boundary.
    let stem = if file_name.len() >= 4
        && file_name.as_bytes()[file_name.len() - 4..].eq_ignore_ascii_case(b".mp4")
    {
        &file_name[..file_name.len() - 4]
    } else {
        file_name
    };

    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

/// Whether a storage content type denotes an mp4 video.
///
/// Matches the prefix so parameterized types like `video/mp4; codecs=...`
/// are accepted.
pub fn is_mp4_content_type(content_type: &str) -> bool {
    content_type.starts_with("video/mp4")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_directories_and_extension() {
        assert_eq!(video_doc_id("a/b/c.MP4").as_deref(), Some("c"));
        assert_eq!(video_doc_id("videos/2025/dance.mp4").as_deref(), Some("dance"));
        assert_eq!(video_doc_id("plain.mp4").as_deref(), Some("plain"));
    }

    #[test]
    fn test_extension_strip_is_case_insensitive() {
        assert_eq!(video_doc_id("x.Mp4").as_deref(), Some("x"));
        assert_eq!(video_doc_id("x.mP4").as_deref(), Some("x"));
    }

    #[test]
    fn test_non_mp4_extension_kept() {
        assert_eq!(video_doc_id("a/b/c.mov").as_deref(), Some("c.mov"));
        assert_eq!(video_doc_id("noext").as_deref(), Some("noext"));
    }

    #[test]
    fn test_multibyte_names_do_not_panic() {
        // Byte len - 4 can fall inside a multibyte character
        assert_eq!(video_doc_id("uploads/€€").as_deref(), Some("€€"));
        assert_eq!(video_doc_id("日本語").as_deref(), Some("日本語"));
        assert_eq!(video_doc_id("uploads/клип.mp4").as_deref(), Some("клип"));
        assert_eq!(video_doc_id("é.mp4").as_deref(), Some("é"));
        assert_eq!(video_doc_id("€").as_deref(), Some("€"));
    }

    #[test]
    fn test_empty_results_rejected() {
        assert_eq!(video_doc_id("a/.mp4"), None);
        assert_eq!(video_doc_id(".mp4"), None);
        assert_eq!(video_doc_id(""), None);
        assert_eq!(video_doc_id("a/b/"), None);
    }

    #[test]
    fn test_mp4_content_type() {
        assert!(is_mp4_content_type("video/mp4"));
        assert!(is_mp4_content_type("video/mp4; codecs=avc1"));
        assert!(!is_mp4_content_type("video/quicktime"));
        assert!(!is_mp4_content_type("image/jpeg"));
        assert!(!is_mp4_content_type(""));
    }
}
