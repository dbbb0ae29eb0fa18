use std::time::Duration;

use url::Url;

mod client;
mod error;
mod helpers;

pub use client::AnimeTraceClient;
pub use error::AnimeTraceError;
pub use helpers::{SearchRequest, SearchResponse, guess_image_mime};

const DEFAULT_ANIMETRACE_BASE_URL: &str = "https://api.animetrace.com";
const SEARCH_PATH: &str = "v1/search";

/// Configuration for the AnimeTrace client.
#[derive(Clone, Debug)]
pub struct AnimeTraceConfig {
    /// Base URL of the API. Defaults to `https://api.animetrace.com`.
    pub(crate) base_url: Url,
    /// Timeout for HTTP requests. Defaults to 30 seconds.
    pub(crate) timeout: Duration,
    /// How often a request is repeated after a connect error or timeout. Defaults to 1.
    pub(crate) max_retries: u32,
}

impl AnimeTraceConfig {
    /// Creates a configuration pointing at the public AnimeTrace API.
    ///
    /// # Errors
    /// Returns `AnimeTraceError::InvalidConfiguration` if the default base URL fails to
    /// parse (which shouldn't happen).
    pub fn new() -> Result<Self, AnimeTraceError> {
        let base_url = Url::parse(DEFAULT_ANIMETRACE_BASE_URL).map_err(|e| {
            AnimeTraceError::InvalidConfiguration(format!(
                "Internal error: Failed to parse default base URL: {}",
                e
            ))
        })?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(30),
            max_retries: 1,
        })
    }

    /// Allows setting a custom base URL.
    pub fn base_url(mut self, url: &str) -> Result<Self, AnimeTraceError> {
        self.base_url = Url::parse(url).map_err(|e| {
            AnimeTraceError::InvalidConfiguration(format!("Invalid base URL '{}': {}", url, e))
        })?;
        if self.base_url.cannot_be_a_base() {
            return Err(AnimeTraceError::InvalidConfiguration(format!(
                "Base URL '{}' cannot have a path",
                url
            )));
        }
        Ok(self)
    }

    /// Allows setting a custom request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Full URL of the search endpoint.
    pub fn search_url(&self) -> Result<Url, AnimeTraceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                AnimeTraceError::InvalidConfiguration(
                    "Base URL cannot be a 'cannot-be-a-base' URL.".to_string(),
                )
            })?
            .pop_if_empty()
            .extend(SEARCH_PATH.split('/'));
        Ok(url)
    }
}
