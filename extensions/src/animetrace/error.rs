use std::path::PathBuf;

use animetrace_core::RecognitionError;
use reqwest::StatusCode;
use thiserror::Error;

/// Internal error type of the AnimeTrace client.
///
/// Converted into the public `RecognitionError` at the `Recognizer` boundary.
#[derive(Error, Debug)]
pub enum AnimeTraceError {
    /// Error during network communication (sending request, reading response).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Image file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to access or read image file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid base64 image data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Invalid image URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The body of a successful response was not the expected JSON.
    #[error("Failed to parse response body: {source}")]
    ResponseParsing {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    /// Non-success HTTP status without a parsable result body.
    #[error("HTTP error: status={status}, body='{body}'")]
    HttpStatus { status: StatusCode, body: String },

    /// The service answered with an error code.
    #[error("AnimeTrace API error: {message} (code: {code})")]
    Api { code: i64, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl AnimeTraceError {
    /// Whether repeating the request might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            AnimeTraceError::Network(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}

impl From<AnimeTraceError> for RecognitionError {
    fn from(error: AnimeTraceError) -> Self {
        match error {
            AnimeTraceError::FileNotFound(path) => RecognitionError::LocalFileMissing(path),
            AnimeTraceError::InvalidBase64(e) => RecognitionError::InvalidImageData(e.to_string()),
            AnimeTraceError::InvalidUrl(e) => RecognitionError::InvalidImageData(e.to_string()),
            AnimeTraceError::Api { code, message } => RecognitionError::Api { code, message },
            e @ (AnimeTraceError::ResponseParsing { .. } | AnimeTraceError::HttpStatus { .. }) => {
                RecognitionError::UnexpectedResponse(e.to_string())
            }
            other => RecognitionError::Network(Box::new(other)),
        }
    }
}
