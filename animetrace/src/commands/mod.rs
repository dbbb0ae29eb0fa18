use std::path::Path;

use crate::{
    app::{self, AppContext, render_reply},
    cli::{ChatArgs, RecognizeArgs},
};
use animetrace_core::{Component, IncomingMessage, command::Command, format::Reply};
use animetrace_extensions::cli::ConsolePrompter;
use anyhow::Result;
use console::style;

// --- Handler Functions ---

pub async fn handle_recognize(args: RecognizeArgs, cx: &AppContext) -> Result<()> {
    let message = recognize_message(args);
    let replies = cx.plugin.handle(Command::Recognize(message.text.clone()), &message).await;
    print_replies(&replies);
    Ok(())
}

/// Builds the chat message a host would deliver for `recognize`.
pub fn recognize_message(args: RecognizeArgs) -> IncomingMessage {
    let text = args.text.join(" ");
    let mut components = vec![];
    if !text.is_empty() {
        components.push(Component::plain(text.clone()));
    }
    if let Some(file) = args.file {
        components.push(Component::image_file(file));
    }
    if let Some(url) = args.url {
        components.push(Component::image_url(url));
    }
    IncomingMessage::new(components, text)
}

/// Runs one of the settings subcommands (`num`, `ai`, `model`).
pub async fn handle_setting(command: Command, cx: &AppContext) -> Result<()> {
    let replies = cx.plugin.handle(command, &IncomingMessage::default()).await;
    print_replies(&replies);
    Ok(())
}

pub async fn handle_help(cx: &AppContext) -> Result<()> {
    print_replies(&[cx.plugin.help()]);
    Ok(())
}

pub async fn handle_chat(args: ChatArgs, cx: &AppContext) -> Result<()> {
    let prompter = match args.base_dir {
        Some(dir) => ConsolePrompter::new().with_base_dir(dir),
        None => ConsolePrompter::new(),
    };
    app::chat(cx, &prompter, &mut std::io::stdout()).await
}

pub async fn handle_config(cx: &AppContext, path: &Path) -> Result<()> {
    let config = cx.plugin.config().await;
    println!("{} {}", style("Settings file:").bold(), path.display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    println!(
        "{} {}",
        style("Model:").bold(),
        style(format!("{} ({})", config.model(), config.model().description())).cyan()
    );
    Ok(())
}

fn print_replies(replies: &[Reply]) {
    for reply in replies {
        println!("{}", render_reply(reply));
    }
}
