use std::{
    fmt,
    path::{Path, PathBuf},
};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::message::IncomingMessage;

/// Inline text shorter than this is never treated as image data.
pub const MIN_BASE64_LENGTH: usize = 100;

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s]+").unwrap());
static BASE64_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9+/]+={0,2}$").unwrap());
static DATA_URI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:image/[A-Za-z0-9.+-]+;base64,").unwrap());

/// Where the image to recognize comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageReference {
    Url(String),
    LocalFile(PathBuf),
    Base64(String),
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageReference::Url(url) => write!(f, "{}", url),
            ImageReference::LocalFile(path) => write!(f, "{}", path.display()),
            ImageReference::Base64(data) => write!(f, "base64 image ({} chars)", data.len()),
        }
    }
}

/// Finds the image a message refers to.
///
/// Attachments win over anything in the text. Within the text a URL wins over
/// inline base64 data.
pub async fn locate(message: &IncomingMessage) -> Option<ImageReference> {
    if let Some(reference) = locate_attachment(message).await {
        debug!(%reference, "Found image attachment");
        return Some(reference);
    }

    let text = message.text.trim();

    if let Some(found) = URL_RE.find(text) {
        debug!(url = found.as_str(), "Found image URL in text");
        return Some(ImageReference::Url(found.as_str().to_string()));
    }

    let data = DATA_URI_RE
        .find(text)
        .map(|prefix| &text[prefix.end()..])
        .unwrap_or(text);
    if data.len() > MIN_BASE64_LENGTH && BASE64_RE.is_match(data) {
        debug!(length = data.len(), "Found inline base64 image data");
        return Some(ImageReference::Base64(data.to_string()));
    }

    None
}

async fn locate_attachment(message: &IncomingMessage) -> Option<ImageReference> {
    // Only the first image component counts
    let (url, file) = message.images().next()?;

    if let Some(path) = file {
        if is_regular_file(path).await {
            return Some(ImageReference::LocalFile(path.clone()));
        }
    }
    if let Some(url) = url.filter(|url| is_http_url(url)) {
        return Some(ImageReference::Url(url.to_string()));
    }
    // An unreachable path is still reported so the client can fail with a clear error
    file.map(|path| ImageReference::LocalFile(path.clone()))
}

/// Whether `path` names a regular file. Directories and unreadable paths do not count.
pub async fn is_regular_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Component;

    fn long_base64() -> String {
        "QUJD".repeat(40)
    }

    #[tokio::test]
    async fn attached_image_url() {
        let msg = IncomingMessage::new(vec![Component::image_url("http://x/y.png")], "");
        assert_eq!(locate(&msg).await, Some(ImageReference::Url("http://x/y.png".into())));
    }

    #[tokio::test]
    async fn url_in_text() {
        let msg = IncomingMessage::text("http://x/y.png");
        assert_eq!(locate(&msg).await, Some(ImageReference::Url("http://x/y.png".into())));
    }

    #[tokio::test]
    async fn first_url_in_text_wins() {
        let msg = IncomingMessage::text("look at https://a/1.jpg and https://b/2.jpg");
        assert_eq!(locate(&msg).await, Some(ImageReference::Url("https://a/1.jpg".into())));
    }

    #[tokio::test]
    async fn attachment_beats_text() {
        let msg = IncomingMessage::new(
            vec![Component::plain("hi"), Component::image_url("https://att/img.png")],
            "https://text/img.png",
        );
        assert_eq!(locate(&msg).await, Some(ImageReference::Url("https://att/img.png".into())));
    }

    #[tokio::test]
    async fn reachable_local_file_beats_url() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let msg = IncomingMessage::new(
            vec![Component::Image {
                url: Some("https://att/img.png".into()),
                file: Some(file.path().to_path_buf()),
            }],
            "",
        );
        assert_eq!(locate(&msg).await, Some(ImageReference::LocalFile(file.path().to_path_buf())));
    }

    #[tokio::test]
    async fn unreachable_file_falls_back_to_url() {
        let msg = IncomingMessage::new(
            vec![Component::Image {
                url: Some("https://att/img.png".into()),
                file: Some("/definitely/not/here.png".into()),
            }],
            "",
        );
        assert_eq!(locate(&msg).await, Some(ImageReference::Url("https://att/img.png".into())));
    }

    #[tokio::test]
    async fn unreachable_file_without_url_is_still_reported() {
        let msg = IncomingMessage::new(vec![Component::image_file("/definitely/not/here.png")], "");
        assert_eq!(
            locate(&msg).await,
            Some(ImageReference::LocalFile("/definitely/not/here.png".into()))
        );
    }

    #[tokio::test]
    async fn non_http_attachment_url_is_ignored() {
        let msg = IncomingMessage::new(
            vec![Component::Image { url: Some("file:///tmp/a.png".into()), file: None }],
            "",
        );
        assert_eq!(locate(&msg).await, None);
    }

    #[tokio::test]
    async fn long_base64_text() {
        let data = long_base64();
        let msg = IncomingMessage::text(format!("  {}  ", data));
        assert_eq!(locate(&msg).await, Some(ImageReference::Base64(data)));
    }

    #[tokio::test]
    async fn padded_base64_text() {
        let data = format!("{}QQ==", long_base64());
        let msg = IncomingMessage::text(data.clone());
        assert_eq!(locate(&msg).await, Some(ImageReference::Base64(data)));
    }

    #[tokio::test]
    async fn data_uri_prefix_is_stripped() {
        let data = long_base64();
        let msg = IncomingMessage::text(format!("data:image/png;base64,{}", data));
        assert_eq!(locate(&msg).await, Some(ImageReference::Base64(data)));
    }

    #[tokio::test]
    async fn short_text_is_not_an_image() {
        assert_eq!(locate(&IncomingMessage::text("what character is this?")).await, None);
        assert_eq!(locate(&IncomingMessage::text("QUJD")).await, None);
        assert_eq!(locate(&IncomingMessage::text("")).await, None);
    }

    #[tokio::test]
    async fn long_text_outside_alphabet_is_not_an_image() {
        let text = "this is a perfectly ordinary sentence. ".repeat(5);
        assert!(text.len() > MIN_BASE64_LENGTH);
        assert_eq!(locate(&IncomingMessage::text(text)).await, None);
    }

    #[tokio::test]
    async fn exactly_minimum_length_is_not_an_image() {
        let text = "A".repeat(MIN_BASE64_LENGTH);
        assert_eq!(locate(&IncomingMessage::text(text)).await, None);
    }

    #[tokio::test]
    async fn directory_is_not_a_reachable_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_regular_file(dir.path()).await);

        let msg = IncomingMessage::new(
            vec![Component::Image {
                url: Some("https://att/img.png".into()),
                file: Some(dir.path().to_path_buf()),
            }],
            "",
        );
        assert_eq!(locate(&msg).await, Some(ImageReference::Url("https://att/img.png".into())));
    }

    #[test]
    fn base64_display_counts_characters() {
        let image = ImageReference::Base64("QUJD".repeat(30));
        assert_eq!(image.to_string(), "base64 image (120 chars)");
    }
}
