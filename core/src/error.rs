use std::{error::Error as StdError, path::PathBuf};

use thiserror::Error;

/// Everything that can go wrong while turning a message into a recognition result.
#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("No valid image found in message")]
    NoImageFound,

    #[error("Image file not found: {0}")]
    LocalFileMissing(PathBuf),

    #[error("Invalid image data: {0}")]
    InvalidImageData(String),

    /// The service answered with a code other than success.
    #[error("API error: {message} (code: {code})")]
    Api { code: i64, message: String },

    #[error("Network error: {0}")]
    Network(#[source] Box<dyn StdError + Send + Sync>),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}
