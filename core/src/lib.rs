pub mod command;
pub mod config;
pub mod error;
pub mod format;
pub mod image;
pub mod message;
pub mod plugin;
pub mod prompter;
pub mod recognition;
pub mod tool;

pub use config::{RecognitionConfig, RecognitionModel};
pub use error::RecognitionError;
pub use image::ImageReference;
pub use message::{Component, IncomingMessage};
pub use plugin::AnimeTracePlugin;
pub use recognition::Recognizer;
