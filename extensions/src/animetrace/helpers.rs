use std::path::Path;

use animetrace_core::{
    RecognitionConfig, RecognitionModel,
    recognition::{DetectionBox, is_success_code},
};
use serde::{Deserialize, Serialize};

use super::error::AnimeTraceError;

// --- Request Structures ---

/// Parameters of a search request.
///
/// Sent as JSON for URL and base64 images; for file uploads the same fields travel
/// as multipart text parts next to the file.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    /// Always 1: ask for every detected character, not only the most prominent one.
    pub is_multi: u8,
    pub model: RecognitionModel,
    /// 1 to let the service locate characters itself, 0 to skip detection.
    pub ai_detect: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
}

impl SearchRequest {
    pub fn new(config: &RecognitionConfig) -> Self {
        Self {
            is_multi: 1,
            model: config.model(),
            ai_detect: u8::from(config.ai_detect()),
            url: None,
            base64: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_base64(mut self, data: impl Into<String>) -> Self {
        self.base64 = Some(data.into());
        self
    }

    /// The common fields as multipart text parts.
    pub fn form_fields(&self) -> [(&'static str, String); 3] {
        [
            ("is_multi", self.is_multi.to_string()),
            ("model", self.model.to_string()),
            ("ai_detect", self.ai_detect.to_string()),
        ]
    }
}

// --- Response Structures ---

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub code: i64,
    /// Human-readable status, in Chinese.
    #[serde(default)]
    pub zh_message: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// One entry per detected region.
    #[serde(default)]
    pub data: Option<Vec<DetectionBox>>,
}

impl SearchResponse {
    pub fn is_success(&self) -> bool {
        is_success_code(self.code)
    }

    pub fn error_message(&self) -> String {
        self.zh_message
            .as_deref()
            .or(self.message.as_deref())
            .filter(|msg| !msg.is_empty())
            .unwrap_or("unknown error")
            .to_string()
    }

    /// Detection boxes for a successful response, the reported error otherwise.
    pub fn into_detections(self) -> Result<Vec<DetectionBox>, AnimeTraceError> {
        if self.is_success() {
            Ok(self.data.unwrap_or_default())
        } else {
            Err(AnimeTraceError::Api {
                code: self.code,
                message: self.error_message(),
            })
        }
    }
}

/// Picks the MIME type for an uploaded image from its file extension.
pub fn guess_image_mime(path: &Path) -> mime::Mime {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => mime::IMAGE_PNG,
        Some("jpg") | Some("jpeg") => mime::IMAGE_JPEG,
        Some("gif") => mime::IMAGE_GIF,
        Some("bmp") => mime::IMAGE_BMP,
        Some("webp") => "image/webp".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}
