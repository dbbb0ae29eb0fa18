use std::{collections::VecDeque, sync::Arc};

use animetrace::{AppContext, app::chat};
use animetrace_core::{
    AnimeTracePlugin, Component, ImageReference, IncomingMessage, RecognitionConfig, RecognitionError,
    Recognizer,
    config::MemoryConfigStore,
    prompter::{PromptError, Prompter},
    recognition::{CharacterMatch, DetectionBox},
};
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Plays back a fixed list of messages, then cancels.
struct ScriptedPrompter {
    lines: Mutex<VecDeque<IncomingMessage>>,
}

impl ScriptedPrompter {
    fn new(lines: Vec<IncomingMessage>) -> Self {
        Self { lines: Mutex::new(lines.into()) }
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn prompt(&self, _message: &str) -> Result<IncomingMessage, PromptError> {
        self.lines.lock().await.pop_front().ok_or(PromptError::Canceled)
    }
}

struct RikkaRecognizer;

#[async_trait]
impl Recognizer for RikkaRecognizer {
    async fn recognize(
        &self,
        _image: &ImageReference,
        _config: &RecognitionConfig,
    ) -> Result<Vec<DetectionBox>, RecognitionError> {
        Ok(vec![DetectionBox::new(vec![CharacterMatch::new(
            "Takanashi Rikka",
            "Chuunibyou demo Koi ga Shitai!",
        )])])
    }
}

fn context() -> AppContext {
    AppContext::new(AnimeTracePlugin::new(
        Arc::new(RikkaRecognizer),
        Arc::new(MemoryConfigStore::default()),
        RecognitionConfig::default(),
    ))
}

async fn run(lines: Vec<IncomingMessage>) -> String {
    let cx = context();
    let prompter = ScriptedPrompter::new(lines);
    let mut out = Vec::new();
    chat(&cx, &prompter, &mut out).await.unwrap();
    console::strip_ansi_codes(&String::from_utf8(out).unwrap()).into_owned()
}

#[tokio::test]
async fn commands_are_answered_until_exit() {
    let output = run(vec![
        IncomingMessage::text("/anime num 5"),
        IncomingMessage::text("exit"),
        IncomingMessage::text("/anime num 6"),
    ])
    .await;

    assert!(output.contains("set to: 5"));
    assert!(!output.contains("set to: 6"));
}

#[tokio::test]
async fn image_without_command_goes_through_tool() {
    let output = run(vec![IncomingMessage::new(
        vec![Component::plain("who is this?"), Component::image_file("/tmp/rikka.png")],
        "who is this?",
    )])
    .await;

    assert!(output.contains("[image: /tmp/rikka.png]"));
    assert!(output.contains("1. Takanashi Rikka 「Chuunibyou demo Koi ga Shitai!」"));
}

#[tokio::test]
async fn plain_chatter_gets_a_hint() {
    let output = run(vec![IncomingMessage::text("hello there"), IncomingMessage::text("")]).await;
    assert!(output.contains("Not an /anime command"));
}

#[tokio::test]
async fn exit_with_an_image_is_recognized() {
    let output = run(vec![IncomingMessage::new(vec![Component::image_url("https://x/exit.png")], "exit")]).await;
    assert!(output.contains("Takanashi Rikka"));
}
