use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{image::ImageReference, recognition::DetectionBox};

pub const NO_MATCH: &str = "🔍 No matching character found";
pub const NO_IMAGE: &str = "❌ No valid image detected";
pub const FILE_MISSING: &str = "❌ Image file not found";
pub const INVALID_IMAGE: &str = "❌ Invalid image data, please send a valid image";
pub const SERVICE_UNAVAILABLE: &str = "🔧 Service temporarily unavailable, please try again later";
pub const RESULT_HEADER: &str = "🎯 Character recognition results:";

/// One piece of a chat reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplyPart {
    Text(String),
    Image(ImageReference),
}

/// A message the plugin sends back to the chat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub parts: Vec<ReplyPart>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![ReplyPart::Text(text.into())],
        }
    }

    pub fn push_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.parts.push(ReplyPart::Text(text.into()));
        self
    }

    pub fn push_image(&mut self, image: ImageReference) -> &mut Self {
        self.parts.push(ReplyPart::Image(image));
        self
    }

    /// All text parts concatenated, images left out.
    pub fn plain_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                ReplyPart::Text(text) => Some(text.as_str()),
                ReplyPart::Image(_) => None,
            })
            .collect()
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageReference> {
        self.parts.iter().filter_map(|part| match part {
            ReplyPart::Image(image) => Some(image),
            ReplyPart::Text(_) => None,
        })
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                ReplyPart::Text(text) => f.write_str(text)?,
                ReplyPart::Image(image) => writeln!(f, "[image: {}]", image)?,
            }
        }
        Ok(())
    }
}

/// Renders the matches of the first detection box.
///
/// Only the first box is shown. At most `result_count` matches are listed; if the
/// box holds more, a footer tells the user how many were left out.
pub fn format_results(detections: &[DetectionBox], image: &ImageReference, result_count: usize) -> Reply {
    let characters = match detections.first() {
        Some(first) if !first.characters.is_empty() => &first.characters,
        _ => return Reply::text(NO_MATCH),
    };

    let mut reply = Reply::default();
    reply.push_image(image.clone());
    reply.push_text(format!("{}\n", RESULT_HEADER));

    for (idx, character) in characters.iter().take(result_count).enumerate() {
        reply.push_text(format!("{}. {} 「{}」\n", idx + 1, character.name, character.work));
    }

    if characters.len() > result_count {
        reply.push_text(format!(
            "\n({} matches in total, showing the first {})",
            characters.len(),
            result_count
        ));
    }

    reply
}

pub fn format_api_error(code: i64, message: &str) -> Reply {
    Reply::text(format!("❌ Error: {} (code: {})", message, code))
}
