use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// AnimeTrace: recognize anime characters in images.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true, disable_help_subcommand = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// File holding the recognition settings (model, num, ai).
    #[arg(long, global = true, env = "ANIMETRACE_CONFIG", default_value = "animetrace.json")]
    pub config: PathBuf,

    /// Base URL of the AnimeTrace API.
    #[arg(long, global = true, env = "ANIMETRACE_API_URL")]
    pub api_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, global = true, env = "ANIMETRACE_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,

    /// Increase verbosity (use multiple times for more).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Recognize the characters in an image.
    #[command(visible_alias = "识图")]
    Recognize(RecognizeArgs),
    /// Set how many matches are shown (1-10).
    Num {
        #[arg(allow_negative_numbers = true)]
        count: i64,
    },
    /// Turn AI detection on (1) or off (2).
    Ai {
        #[arg(allow_negative_numbers = true)]
        mode: i64,
    },
    /// Switch the default recognition model.
    #[command(visible_alias = "模型")]
    Model {
        /// One of pre_stable, anime_model_lovelive, anime, full_game_model_kira.
        name: String,
    },
    /// Show usage and the available models.
    #[command(visible_alias = "帮助")]
    Help,
    /// Start an interactive chat session that understands /anime commands.
    Chat(ChatArgs),
    /// Print the current recognition settings.
    Config,
}

// --- Argument Structs for each Subcommand ---

#[derive(Args, Debug)]
pub struct RecognizeArgs {
    /// Local image file to upload.
    #[arg(long, short, conflicts_with = "url")]
    pub file: Option<PathBuf>,

    /// URL of a remote image.
    #[arg(long, short, conflicts_with = "file")]
    pub url: Option<String>,

    /// Free text; may contain an image URL or base64 image data.
    pub text: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Directory that relative `@path` attachments are resolved against.
    #[arg(long)]
    pub base_dir: Option<PathBuf>,
}
