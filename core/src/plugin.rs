use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    command::{Command, CommandParseError},
    config::{ConfigError, ConfigStore, RecognitionConfig, RecognitionModel},
    error::RecognitionError,
    format::{self, Reply},
    image::{self, ImageReference},
    message::IncomingMessage,
    recognition::{DetectionBox, Recognizer},
    tool::{SearchAnimeTool, Tool},
};

const INVALID_NUM: &str = "❌ Invalid count, range: 1-10";
const INVALID_AI: &str = "❌ Invalid AI mode, choose 1 (on) or 2 (off)";
const UNKNOWN_COMMAND: &str = "❓ Unknown command, send /anime help for usage";

/// The chat-facing side of the plugin: binds `/anime` commands to recognition
/// and owns the mutable settings.
///
/// Everything a single recognition needs (image, settings snapshot) is passed
/// along the call chain, so concurrent conversations never see each other's data.
pub struct AnimeTracePlugin {
    recognizer: Arc<dyn Recognizer>,
    store: Arc<dyn ConfigStore>,
    config: RwLock<RecognitionConfig>,
}

/// Outcome of one successful recognition.
#[derive(Debug, Clone)]
pub struct Recognition {
    pub image: ImageReference,
    pub detections: Vec<DetectionBox>,
    pub result_count: usize,
}

impl Recognition {
    pub fn reply(&self) -> Reply {
        format::format_results(&self.detections, &self.image, self.result_count)
    }
}

impl AnimeTracePlugin {
    pub fn new(
        recognizer: Arc<dyn Recognizer>,
        store: Arc<dyn ConfigStore>,
        config: RecognitionConfig,
    ) -> Self {
        Self {
            recognizer,
            store,
            config: RwLock::new(config),
        }
    }

    /// Creates the plugin with whatever config the store holds, or the defaults.
    pub async fn load(
        recognizer: Arc<dyn Recognizer>,
        store: Arc<dyn ConfigStore>,
    ) -> Result<Self, ConfigError> {
        let config = store.load().await?.unwrap_or_default();
        debug!(?config, "Loaded recognition config");
        Ok(Self::new(recognizer, store, config))
    }

    pub async fn config(&self) -> RecognitionConfig {
        self.config.read().await.clone()
    }

    /// LLM tools offered by the plugin.
    pub fn tools(self: &Arc<Self>) -> Vec<Box<dyn Tool>> {
        vec![Box::new(SearchAnimeTool::new(self.clone()))]
    }

    /// Handles a raw chat message. Returns `None` if the text is not an `/anime` command.
    pub async fn handle_message(&self, message: &IncomingMessage) -> Option<Vec<Reply>> {
        match Command::parse(&message.text) {
            Ok(command) => {
                // Subcommands only see the text that follows them
                let args = match &command {
                    Command::Recognize(args) => args.clone(),
                    _ => String::new(),
                };
                Some(self.handle(command, &message.with_text(args)).await)
            }
            Err(CommandParseError::NotACommand) => None,
            Err(e) => {
                debug!(error = %e, text = %message.text, "Rejected command");
                Some(vec![parse_error_reply(&e)])
            }
        }
    }

    pub async fn handle(&self, command: Command, message: &IncomingMessage) -> Vec<Reply> {
        let reply = match command {
            Command::Help => self.help(),
            Command::Num(count) => self.set_num(count).await,
            Command::Ai(mode) => self.set_ai(mode).await,
            Command::Model(name) => self.set_model(&name).await,
            Command::Recognize(_) => self.recognize(message).await,
        };
        vec![reply]
    }

    pub fn help(&self) -> Reply {
        let models = RecognitionModel::ALL
            .iter()
            .enumerate()
            .map(|(i, model)| {
                let default = if *model == RecognitionModel::default() { " (default)" } else { "" };
                format!("  [{}] {}{}: {}", i + 1, model, default, model.description())
            })
            .collect::<Vec<_>>()
            .join("\n");

        Reply::text(format!(
            "📘 Anime character recognition\n\
             \n\
             🔍 Usage:\n\
             /anime recognize <image>   recognize characters in an image\n\
             \n\
             ⚙️ Settings:\n\
             /anime model <name>        set the default model\n\
             /anime ai <1|2>            1: AI detection on (default), 2: off\n\
             /anime num <1-10>          number of matches to show (default 3)\n\
             \n\
             📊 Models:\n\
             {}",
            models
        ))
    }

    #[instrument(skip(self))]
    pub async fn set_num(&self, count: i64) -> Reply {
        let mut config = self.config.write().await;
        let mut updated = config.clone();
        if let Err(e) = updated.set_result_count(count) {
            warn!(error = %e, "Rejected result count");
            return Reply::text(INVALID_NUM);
        }
        self.commit(&mut config, updated).await;
        Reply::text(format!("✅ Number of matches to show set to: {}", count))
    }

    #[instrument(skip(self))]
    pub async fn set_ai(&self, mode: i64) -> Reply {
        let mut config = self.config.write().await;
        let mut updated = config.clone();
        if let Err(e) = updated.set_ai_mode(mode) {
            warn!(error = %e, "Rejected AI mode");
            return Reply::text(INVALID_AI);
        }
        let state = if updated.ai_detect() { "on" } else { "off" };
        self.commit(&mut config, updated).await;
        Reply::text(format!("✅ AI detection turned {}", state))
    }

    #[instrument(skip(self))]
    pub async fn set_model(&self, name: &str) -> Reply {
        let mut config = self.config.write().await;
        let mut updated = config.clone();
        match updated.set_model(name) {
            Ok(model) => {
                self.commit(&mut config, updated).await;
                Reply::text(format!("✅ Default model switched to: {}", model))
            }
            Err(ConfigError::AlreadySet(model)) => {
                Reply::text(format!("❌ Default model is already: {}", model))
            }
            Err(e) => {
                warn!(error = %e, "Rejected model");
                invalid_model_reply()
            }
        }
    }

    async fn commit(&self, current: &mut RecognitionConfig, updated: RecognitionConfig) {
        *current = updated;
        if let Err(e) = self.store.save(current).await {
            // The in-memory value stays; it is saved again with the next change
            error!(error = %e, "Failed to persist recognition config");
        }
    }

    /// Runs the full locate → recognize → format cycle for one message.
    pub async fn recognize(&self, message: &IncomingMessage) -> Reply {
        match self.search(message).await {
            Ok(recognition) => recognition.reply(),
            Err(e) => error_reply(e),
        }
    }

    /// Like [`recognize`](Self::recognize), but stays silent when the message holds no image.
    pub async fn search_anime(&self, message: &IncomingMessage) -> Option<Reply> {
        match self.search(message).await {
            Ok(recognition) => Some(recognition.reply()),
            Err(RecognitionError::NoImageFound) => None,
            Err(e) => Some(error_reply(e)),
        }
    }

    #[instrument(skip(self, message))]
    pub async fn search(&self, message: &IncomingMessage) -> Result<Recognition, RecognitionError> {
        let image = image::locate(message).await.ok_or(RecognitionError::NoImageFound)?;
        let config = self.config().await;
        info!(%image, model = %config.model(), "Recognizing image");

        let detections = self.recognizer.recognize(&image, &config).await?;
        debug!(boxes = detections.len(), "Recognition finished");

        Ok(Recognition {
            image,
            detections,
            result_count: config.result_count(),
        })
    }
}

fn error_reply(error: RecognitionError) -> Reply {
    match error {
        RecognitionError::NoImageFound => Reply::text(format::NO_IMAGE),
        RecognitionError::LocalFileMissing(path) => {
            warn!(path = %path.display(), "Image file not found");
            Reply::text(format::FILE_MISSING)
        }
        RecognitionError::InvalidImageData(reason) => {
            warn!(%reason, "Rejected image data");
            Reply::text(format::INVALID_IMAGE)
        }
        RecognitionError::Api { code, message } => {
            error!(code, %message, "API reported an error");
            format::format_api_error(code, &message)
        }
        other => {
            error!(error = %other, "Recognition failed");
            Reply::text(format::SERVICE_UNAVAILABLE)
        }
    }
}

fn invalid_model_reply() -> Reply {
    Reply::text(format!("❌ Invalid model, available:\n{}", RecognitionModel::labeled_list()))
}

fn parse_error_reply(error: &CommandParseError) -> Reply {
    match error {
        CommandParseError::MissingArgument("num")
        | CommandParseError::InvalidNumber { subcommand: "num", .. } => Reply::text(INVALID_NUM),
        CommandParseError::MissingArgument("ai")
        | CommandParseError::InvalidNumber { subcommand: "ai", .. } => Reply::text(INVALID_AI),
        CommandParseError::MissingArgument("model") => invalid_model_reply(),
        _ => Reply::text(UNKNOWN_COMMAND),
    }
}
