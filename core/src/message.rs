use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A single component of an incoming chat message.
///
/// Hosts deliver messages as a chain of components. Only the parts needed to find
/// an image are modelled here; everything else the host sends ends up in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Component {
    Plain(String),
    Image {
        /// Remote location of the image, if the platform provides one.
        url: Option<String>,
        /// Local path of the image, if the host has already downloaded it.
        file: Option<PathBuf>,
    },
    Other(String),
}

impl Component {
    pub fn plain(text: impl Into<String>) -> Self {
        Component::Plain(text.into())
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        Component::Image {
            url: Some(url.into()),
            file: None,
        }
    }

    pub fn image_file(path: impl Into<PathBuf>) -> Self {
        Component::Image {
            url: None,
            file: Some(path.into()),
        }
    }
}

/// A chat message as seen by the plugin.
///
/// `text` holds the plain text the command handler should look at, i.e. whatever
/// followed the command words.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub components: Vec<Component>,
    pub text: String,
}

impl IncomingMessage {
    pub fn new(components: Vec<Component>, text: impl Into<String>) -> Self {
        Self {
            components,
            text: text.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Vec::new(), text)
    }

    /// Returns a copy of this message carrying `text` instead of the original text.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            components: self.components.clone(),
            text: text.into(),
        }
    }

    pub fn images(&self) -> impl Iterator<Item = (Option<&str>, Option<&PathBuf>)> {
        self.components.iter().filter_map(|component| match component {
            Component::Image { url, file } => Some((url.as_deref(), file.as_ref())),
            _ => None,
        })
    }
}
