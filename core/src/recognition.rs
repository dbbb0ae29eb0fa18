use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{config::RecognitionConfig, error::RecognitionError, image::ImageReference};

/// Response code for a fully successful search.
pub const CODE_SUCCESS: i64 = 0;
/// Response code the service uses when it was busy but still produced a result.
pub const CODE_BUSY_PROCESSED: i64 = 17731;

/// Whether a response code carries a usable result.
pub fn is_success_code(code: i64) -> bool {
    matches!(code, CODE_SUCCESS | CODE_BUSY_PROCESSED)
}

/// One candidate character for a detection box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterMatch {
    #[serde(rename = "character")]
    pub name: String,
    pub work: String,
}

impl CharacterMatch {
    pub fn new(name: impl Into<String>, work: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            work: work.into(),
        }
    }
}

/// A region of the submitted image together with its ranked candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DetectionBox {
    /// Region as reported by the service, typically normalized `[x1, y1, x2, y2]`.
    #[serde(rename = "box", default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Vec<f64>>,
    #[serde(rename = "character", default)]
    pub characters: Vec<CharacterMatch>,
}

impl DetectionBox {
    pub fn new(characters: Vec<CharacterMatch>) -> Self {
        Self {
            region: None,
            characters,
        }
    }
}

/// Anything able to identify characters in an image.
///
/// The command surface only talks to this trait; the HTTP client lives in the
/// extensions crate.
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(
        &self,
        image: &ImageReference,
        config: &RecognitionConfig,
    ) -> Result<Vec<DetectionBox>, RecognitionError>;
}
