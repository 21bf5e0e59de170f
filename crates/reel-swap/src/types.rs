//! Wire types for the prediction API.

use serde::{Deserialize, Serialize};

/// Input parameters for the roop face swap model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapInput {
    /// URL of the face image to swap from
    pub swap_image: String,
    /// URL of the video to swap into
    pub target_video: String,
    /// Auto-detect the face to replace in the target
    pub detect_target_face: bool,
    /// Output container format
    pub output_format: String,
    /// Encoder quality preset
    pub video_quality: String,
}

impl SwapInput {
    /// Standard input for a face swap: mp4 output at the better quality preset.
    pub fn new(swap_image: impl Into<String>, target_video: impl Into<String>) -> Self {
        Self {
            swap_image: swap_image.into(),
            target_video: target_video.into(),
            detect_target_face: true,
            output_format: "mp4".to_string(),
            video_quality: "better".to_string(),
        }
    }
}

/// Request body for creating a prediction.
#[derive(Debug, Serialize)]
pub struct PredictionRequest {
    /// Model version hash
    pub version: String,
    pub input: SwapInput,
}

/// Lifecycle states of a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl PredictionStatus {
    /// No further polling will change this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

/// A prediction as reported by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: PredictionStatus,
    /// Model output. A download URL string for this model, but some models
    /// return a list of URLs.
    #[serde(default)]
    pub output: Option<serde_json::Value>,
    /// Failure reason when status is failed
    #[serde(default)]
    pub error: Option<String>,
}

impl Prediction {
    /// The output download URL, if present.
    pub fn output_url(&self) -> Option<&str> {
        match self.output.as_ref()? {
            serde_json::Value::String(s) => Some(s.as_str()),
            serde_json::Value::Array(items) => items.first().and_then(|v| v.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_input_defaults() {
        let input = SwapInput::new("https://i/face.jpg", "https://v/clip.mp4");
        assert!(input.detect_target_face);
        assert_eq!(input.output_format, "mp4");
        assert_eq!(input.video_quality, "better");
    }

    #[test]
    fn test_status_deserialization() {
        let s: PredictionStatus = serde_json::from_str("\"succeeded\"").unwrap();
        assert_eq!(s, PredictionStatus::Succeeded);
        assert!(s.is_terminal());

        let s: PredictionStatus = serde_json::from_str("\"starting\"").unwrap();
        assert!(!s.is_terminal());
    }

    #[test]
    fn test_output_url_string_and_array() {
        let p: Prediction = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "status": "succeeded",
            "output": "https://cdn/out.mp4"
        }))
        .unwrap();
        assert_eq!(p.output_url(), Some("https://cdn/out.mp4"));

        let p: Prediction = serde_json::from_value(serde_json::json!({
            "id": "p2",
            "status": "succeeded",
            "output": ["https://cdn/a.mp4", "https://cdn/b.mp4"]
        }))
        .unwrap();
        assert_eq!(p.output_url(), Some("https://cdn/a.mp4"));
    }

    #[test]
    fn test_output_url_absent() {
        let p: Prediction = serde_json::from_value(serde_json::json!({
            "id": "p3",
            "status": "processing"
        }))
        .unwrap();
        assert!(p.output_url().is_none());
    }
}
