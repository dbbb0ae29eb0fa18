use async_trait::async_trait;
use thiserror::Error;

use crate::message::IncomingMessage;

/// Source of chat messages typed by a person, such as a terminal.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Shows `message` as the prompt and waits for the next chat message, attachments included.
    async fn prompt(&self, message: &str) -> Result<IncomingMessage, PromptError>;
}

#[derive(Debug, Error)]
pub enum PromptError {
    /// The user closed the prompt (Ctrl-C, Ctrl-D or Esc).
    #[error("Input canceled")]
    Canceled,

    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input task did not finish: {0}")]
    Async(#[from] tokio::task::JoinError),
}
