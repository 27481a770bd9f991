use serde::{Deserialize, Serialize};

use crate::domain::{DetectedObject, Dimensions, RgbColor};

pub const UPLOAD_PATH: &str = "/api/upload";
pub const UPLOAD_FIELD: &str = "image";
pub const NEW_UPLOAD_EVENT: &str = "new_upload";

/// Response payload of `POST /api/upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    pub processed_image_url: String,
    #[serde(default)]
    pub objects: Vec<DetectedObject>,
    #[serde(default)]
    pub extracted_items_urls: Vec<String>,
    #[serde(default)]
    pub related_images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominant_color: Option<RgbColor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shapes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uniqueness_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl UploadResult {
    pub fn new(processed_image_url: impl Into<String>) -> Self {
        Self {
            processed_image_url: processed_image_url.into(),
            objects: Vec::new(),
            extracted_items_urls: Vec::new(),
            related_images: Vec::new(),
            dominant_color: None,
            shapes: Vec::new(),
            dimensions: None,
            uniqueness_score: None,
            tags: Vec::new(),
        }
    }
}

/// Broadcast when any user finishes an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUploadPayload {
    pub image_url: String,
    pub username: String,
    pub filename: String,
    /// `YYYY-MM-DD HH:MM:SS`, server local time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum FeedEvent {
    NewUpload(NewUploadPayload),
}

#[derive(Deserialize)]
struct FeedFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: serde_json::Value,
}

impl FeedEvent {
    /// Decodes one push frame. Frames for other event types yield `Ok(None)`.
    pub fn decode(text: &str) -> Result<Option<Self>, serde_json::Error> {
        let frame: FeedFrame = serde_json::from_str(text)?;
        match frame.kind.as_str() {
            NEW_UPLOAD_EVENT => {
                serde_json::from_value(frame.payload).map(|payload| Some(Self::NewUpload(payload)))
            }
            _ => Ok(None),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::NewUpload(_) => NEW_UPLOAD_EVENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_result_accepts_full_backend_payload() {
        let body = r#"{
            "objects": [{"name": "dog", "confidence": 0.91, "bbox": [1.0, 2.0, 30.5, 40.0]}],
            "dominant_color": [12, 200, 7],
            "shapes": ["Rectangle"],
            "dimensions": {"width": 640, "height": 480},
            "uniqueness_score": 3.12,
            "processed_image_path": "processed_dog.jpg",
            "extracted_items": ["crop_0_dog.jpg"],
            "tags": ["dog"],
            "related_images": [],
            "processed_image_url": "/static/uploads/processed_dog.jpg",
            "extracted_items_urls": ["/static/uploads/crops/crop_0_dog.jpg"]
        }"#;

        let result: UploadResult = serde_json::from_str(body).expect("parse");
        assert_eq!(result.objects.len(), 1);
        assert_eq!(result.objects[0].bbox, Some([1.0, 2.0, 30.5, 40.0]));
        assert_eq!(result.dominant_color, Some(RgbColor(12, 200, 7)));
        assert_eq!(
            result.dimensions,
            Some(Dimensions {
                width: 640,
                height: 480
            })
        );
        assert_eq!(result.extracted_items_urls.len(), 1);
        assert!(result.related_images.is_empty());
    }

    #[test]
    fn upload_result_defaults_missing_sequences() {
        let result: UploadResult =
            serde_json::from_str(r#"{"processed_image_url": "/out.jpg"}"#).expect("parse");
        assert!(result.objects.is_empty());
        assert!(result.extracted_items_urls.is_empty());
        assert!(result.related_images.is_empty());
    }

    #[test]
    fn feed_event_uses_type_and_payload_envelope() {
        let event = FeedEvent::NewUpload(NewUploadPayload {
            image_url: "/static/uploads/processed_a.jpg".into(),
            username: "Guest".into(),
            filename: "a.jpg".into(),
            upload_date: None,
        });
        let text = serde_json::to_string(&event).expect("serialize");
        assert!(text.starts_with(r#"{"type":"new_upload","payload":{"#));
        assert_eq!(FeedEvent::decode(&text).expect("decode"), Some(event));
    }

    #[test]
    fn feed_event_decode_skips_other_types() {
        let decoded = FeedEvent::decode(r#"{"type":"connect","payload":null}"#).expect("decode");
        assert_eq!(decoded, None);
        assert!(FeedEvent::decode("not json").is_err());
        assert!(FeedEvent::decode(r#"{"type":"new_upload","payload":{"username":"x"}}"#).is_err());
    }
}
