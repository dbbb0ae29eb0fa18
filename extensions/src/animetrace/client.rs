use std::path::Path;

use animetrace_core::{
    ImageReference, RecognitionConfig, RecognitionError, Recognizer, image::is_regular_file,
    recognition::DetectionBox,
};
use async_trait::async_trait;
use base64::{
    Engine,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use tokio::fs::File;
use tracing::{debug, error, info, instrument, warn};

use super::AnimeTraceConfig;
use super::error::AnimeTraceError;
use super::helpers::{SearchRequest, SearchResponse, guess_image_mime};

/// Accepts base64 with or without trailing padding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// HTTP client for the AnimeTrace search API.
#[derive(Clone, Debug)]
pub struct AnimeTraceClient {
    client: Client,
    config: AnimeTraceConfig,
}

impl AnimeTraceClient {
    /// Creates a client for the public API with default settings.
    pub fn new() -> Result<Self, AnimeTraceError> {
        Self::new_with_config(AnimeTraceConfig::new()?, None)
    }

    /// Creates a client with a custom configuration and, optionally, a pre-built `reqwest::Client`.
    pub fn new_with_config(
        config: AnimeTraceConfig,
        http_client: Option<Client>,
    ) -> Result<Self, AnimeTraceError> {
        let client = match http_client {
            Some(client) => client,
            None => Client::builder().timeout(config.timeout).build()?,
        };
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AnimeTraceConfig {
        &self.config
    }

    /// Sends one image to the search endpoint and returns the detection boxes.
    ///
    /// Local files are uploaded as multipart form data, URLs and base64 payloads are
    /// sent as JSON. Connect errors and timeouts are retried up to `max_retries` times.
    #[instrument(skip(self, image, config), fields(image = %image, model = %config.model()))]
    pub async fn search(
        &self,
        image: &ImageReference,
        config: &RecognitionConfig,
    ) -> Result<Vec<DetectionBox>, AnimeTraceError> {
        validate(image).await?;
        let request = SearchRequest::new(config);

        let mut attempt = 0;
        loop {
            match self.send(image, &request).await {
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(target: "animetrace_api::search", error = %e, attempt, "Transient error, retrying");
                }
                result => return result,
            }
        }
    }

    async fn send(
        &self,
        image: &ImageReference,
        request: &SearchRequest,
    ) -> Result<Vec<DetectionBox>, AnimeTraceError> {
        let url = self.config.search_url()?;
        let builder = self.client.post(url.clone());

        let builder = match image {
            ImageReference::LocalFile(path) => {
                debug!(target: "animetrace_api::search", url = %url, path = %path.display(), "Uploading image file");
                builder.multipart(build_form(path, request).await?)
            }
            ImageReference::Url(image_url) => {
                debug!(target: "animetrace_api::search", url = %url, "Sending image URL");
                builder.json(&request.clone().with_url(image_url.as_str()))
            }
            ImageReference::Base64(data) => {
                debug!(target: "animetrace_api::search", url = %url, bytes = data.len(), "Sending base64 image");
                builder.json(&request.clone().with_base64(data.as_str()))
            }
        };

        let response = match builder.send().await {
            Ok(resp) => resp,
            Err(e) => {
                error!(target: "animetrace_api::search", error = %e, "Search request failed");
                return Err(AnimeTraceError::Network(e));
            }
        };

        Self::handle_response(response).await
    }

    /// The API reports failures in the JSON body, so the body is parsed before the status is judged.
    #[instrument(skip(response), fields(status = response.status().as_u16()))]
    async fn handle_response(response: Response) -> Result<Vec<DetectionBox>, AnimeTraceError> {
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<SearchResponse>(&body) {
            Ok(parsed) => {
                if parsed.is_success() {
                    info!(
                        target: "animetrace_api::search",
                        code = parsed.code,
                        boxes = parsed.data.as_ref().map_or(0, Vec::len),
                        "Search successful"
                    );
                } else {
                    warn!(target: "animetrace_api::search", code = parsed.code, message = %parsed.error_message(), "API returned an error code");
                }
                parsed.into_detections()
            }
            Err(source) if status.is_success() => {
                error!(target: "animetrace_api::search", error = %source, "Failed to deserialize response body");
                Err(AnimeTraceError::ResponseParsing { body, source })
            }
            Err(_) => {
                error!(target: "animetrace_api::search", %status, "Search returned error status");
                Err(AnimeTraceError::HttpStatus { status, body })
            }
        }
    }
}

/// Rejects images that cannot be sent before any request goes out.
async fn validate(image: &ImageReference) -> Result<(), AnimeTraceError> {
    match image {
        ImageReference::LocalFile(path) => {
            if !is_regular_file(path).await {
                error!(target: "animetrace_api::search", path = %path.display(), "Image file does not exist or is not a regular file");
                return Err(AnimeTraceError::FileNotFound(path.clone()));
            }
        }
        ImageReference::Url(url) => {
            url::Url::parse(url)?;
        }
        ImageReference::Base64(data) => {
            LENIENT_BASE64.decode(data.trim())?;
        }
    }
    Ok(())
}

async fn build_form(path: &Path, request: &SearchRequest) -> Result<Form, AnimeTraceError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("image")
        .to_string();

    let file = File::open(path).await?;
    let file_size = file.metadata().await?.len();
    let stream = reqwest::Body::wrap_stream(tokio_util::io::ReaderStream::new(file));
    let file_part = Part::stream_with_length(stream, file_size)
        .file_name(file_name)
        .mime_str(guess_image_mime(path).as_ref())?;

    let form = request
        .form_fields()
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value));
    Ok(form.part("file", file_part))
}

#[async_trait]
impl Recognizer for AnimeTraceClient {
    async fn recognize(
        &self,
        image: &ImageReference,
        config: &RecognitionConfig,
    ) -> Result<Vec<DetectionBox>, RecognitionError> {
        Ok(self.search(image, config).await?)
    }
}
