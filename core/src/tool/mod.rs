use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::{format::Reply, message::IncomingMessage, plugin::AnimeTracePlugin};

/// A function the host's language model may decide to call.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> String;
    /// JSON schema of the arguments the model has to supply.
    fn parameters(&self) -> serde_json::Value;
    /// Runs the tool against the message that triggered it. `None` means nothing to say.
    async fn execute(&self, message: &IncomingMessage) -> Option<Reply>;
}

/// Lets a language model start recognition when the user asks who is in a picture.
pub struct SearchAnimeTool {
    plugin: Arc<AnimeTracePlugin>,
}

impl SearchAnimeTool {
    pub fn new(plugin: Arc<AnimeTracePlugin>) -> Self {
        Self { plugin }
    }
}

#[async_trait]
impl Tool for SearchAnimeTool {
    fn name(&self) -> &str {
        "search_anime"
    }

    fn description(&self) -> String {
        "Call this tool when the user wants to identify the anime characters in an image.".to_string()
    }

    fn parameters(&self) -> serde_json::Value {
        // The image comes from the message itself
        json!({
            "type": "object",
            "properties": {},
            "required": [],
        })
    }

    async fn execute(&self, message: &IncomingMessage) -> Option<Reply> {
        self.plugin.search_anime(message).await
    }
}
