use std::{fmt, str::FromStr, sync::Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_RESULT_COUNT: u8 = 1;
pub const MAX_RESULT_COUNT: u8 = 10;
pub const DEFAULT_RESULT_COUNT: u8 = 3;

/// `ai` value that enables AI detection.
pub const AI_MODE_ON: i64 = 1;
/// `ai` value that disables AI detection.
pub const AI_MODE_OFF: i64 = 2;

/// Recognition profiles offered by the upstream API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionModel {
    #[default]
    PreStable,
    AnimeModelLovelive,
    Anime,
    FullGameModelKira,
}

impl RecognitionModel {
    pub const ALL: [RecognitionModel; 4] = [
        RecognitionModel::PreStable,
        RecognitionModel::AnimeModelLovelive,
        RecognitionModel::Anime,
        RecognitionModel::FullGameModelKira,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecognitionModel::PreStable => "pre_stable",
            RecognitionModel::AnimeModelLovelive => "anime_model_lovelive",
            RecognitionModel::Anime => "anime",
            RecognitionModel::FullGameModelKira => "full_game_model_kira",
        }
    }

    /// What kind of artwork the model is tuned for.
    pub fn description(&self) -> &'static str {
        match self {
            RecognitionModel::PreStable => "fan art and original illustrations",
            RecognitionModel::AnimeModelLovelive => "general purpose, works for most scenes",
            RecognitionModel::Anime => "anime screenshots and key art",
            RecognitionModel::FullGameModelKira => "galgame artwork",
        }
    }

    /// Numbered list of all models, one per line: `[1] pre_stable`.
    pub fn labeled_list() -> String {
        Self::ALL
            .iter()
            .enumerate()
            .map(|(i, model)| format!("[{}] {}", i + 1, model))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for RecognitionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecognitionModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|model| model.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidModel(s.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid result count {0}, expected 1-10")]
    InvalidResultCount(i64),

    #[error("Invalid AI mode {0}, expected 1 (on) or 2 (off)")]
    InvalidAiMode(i64),

    #[error("Unknown model '{0}'")]
    InvalidModel(String),

    #[error("Model '{0}' is already selected")]
    AlreadySet(RecognitionModel),

    #[error("Config store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Settings that shape every recognition request.
///
/// All mutation goes through the setters, so the documented ranges always hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredConfig", into = "StoredConfig")]
pub struct RecognitionConfig {
    model: RecognitionModel,
    result_count: u8,
    ai_detect: bool,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            model: RecognitionModel::default(),
            result_count: DEFAULT_RESULT_COUNT,
            ai_detect: true,
        }
    }
}

impl RecognitionConfig {
    pub fn model(&self) -> RecognitionModel {
        self.model
    }

    pub fn result_count(&self) -> usize {
        self.result_count as usize
    }

    pub fn ai_detect(&self) -> bool {
        self.ai_detect
    }

    /// `ai` as the host stores it: 1 for on, 2 for off.
    pub fn ai_mode(&self) -> i64 {
        if self.ai_detect { AI_MODE_ON } else { AI_MODE_OFF }
    }

    pub fn set_result_count(&mut self, count: i64) -> Result<(), ConfigError> {
        if !(MIN_RESULT_COUNT as i64..=MAX_RESULT_COUNT as i64).contains(&count) {
            return Err(ConfigError::InvalidResultCount(count));
        }
        self.result_count = count as u8;
        Ok(())
    }

    pub fn set_ai_mode(&mut self, mode: i64) -> Result<(), ConfigError> {
        self.ai_detect = match mode {
            AI_MODE_ON => true,
            AI_MODE_OFF => false,
            other => return Err(ConfigError::InvalidAiMode(other)),
        };
        Ok(())
    }

    /// Switches to the named model. Selecting the current model is rejected.
    pub fn set_model(&mut self, name: &str) -> Result<RecognitionModel, ConfigError> {
        let model: RecognitionModel = name.trim().parse()?;
        if model == self.model {
            return Err(ConfigError::AlreadySet(model));
        }
        self.model = model;
        Ok(model)
    }
}

/// On-disk shape, mirroring the host's config dictionary.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredConfig {
    #[serde(default)]
    model: String,
    #[serde(default = "default_num")]
    num: i64,
    #[serde(default = "default_ai")]
    ai: i64,
}

fn default_num() -> i64 {
    DEFAULT_RESULT_COUNT as i64
}

fn default_ai() -> i64 {
    AI_MODE_ON
}

impl TryFrom<StoredConfig> for RecognitionConfig {
    type Error = ConfigError;

    fn try_from(stored: StoredConfig) -> Result<Self, Self::Error> {
        let mut config = RecognitionConfig::default();
        if !stored.model.is_empty() {
            config.model = stored.model.parse()?;
        }
        config.set_result_count(stored.num)?;
        config.set_ai_mode(stored.ai)?;
        Ok(config)
    }
}

impl From<RecognitionConfig> for StoredConfig {
    fn from(config: RecognitionConfig) -> Self {
        StoredConfig {
            model: config.model.to_string(),
            num: config.result_count as i64,
            ai: config.ai_mode(),
        }
    }
}

/// Persistence for [`RecognitionConfig`], supplied by whoever hosts the plugin.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Returns the saved config, or `None` if nothing has been saved yet.
    async fn load(&self) -> Result<Option<RecognitionConfig>, ConfigError>;

    async fn save(&self, config: &RecognitionConfig) -> Result<(), ConfigError>;
}

/// Keeps the config in memory. Useful when the host persists settings itself.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    saved: Mutex<Option<RecognitionConfig>>,
}

impl MemoryConfigStore {
    pub fn new(initial: Option<RecognitionConfig>) -> Self {
        Self { saved: Mutex::new(initial) }
    }

    pub fn snapshot(&self) -> Option<RecognitionConfig> {
        self.saved.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn load(&self) -> Result<Option<RecognitionConfig>, ConfigError> {
        Ok(self.snapshot())
    }

    async fn save(&self, config: &RecognitionConfig) -> Result<(), ConfigError> {
        *self.saved.lock().unwrap_or_else(|e| e.into_inner()) = Some(config.clone());
        Ok(())
    }
}
