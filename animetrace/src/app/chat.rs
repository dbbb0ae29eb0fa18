use std::io::Write;

use animetrace_core::prompter::{PromptError, Prompter};
use console::style;
use tracing::{debug, info};

use super::{AppContext, render_reply};

/// Runs the interactive session until the user types `exit` or cancels the prompt.
///
/// `/anime` commands go to the plugin's command surface. Any other message that
/// carries an image is handed to the plugin's tools, the way a conversational host would.
pub async fn chat(cx: &AppContext, prompter: &dyn Prompter, out: &mut impl Write) -> anyhow::Result<()> {
    writeln!(out, "{}", style("Send /anime help for usage, 'exit' to quit.").dim())?;
    let tools = cx.plugin.tools();

    loop {
        let message = match prompter.prompt("anime").await {
            Ok(message) => message,
            Err(PromptError::Canceled) => break,
            Err(e) => return Err(e.into()),
        };

        let has_images = message.images().next().is_some();
        if message.text == "exit" && !has_images {
            break;
        }
        if message.text.is_empty() && !has_images {
            continue;
        }

        if let Some(replies) = cx.plugin.handle_message(&message).await {
            for reply in replies {
                writeln!(out, "{}", render_reply(&reply))?;
            }
            continue;
        }

        let mut answered = false;
        for tool in &tools {
            debug!(tool = tool.name(), "Offering message to tool");
            if let Some(reply) = tool.execute(&message).await {
                writeln!(out, "{}", render_reply(&reply))?;
                answered = true;
                break;
            }
        }
        if !answered {
            writeln!(out, "{}", style("Not an /anime command. Send /anime help for usage.").dim())?;
        }
    }

    info!("Chat session ended");
    Ok(())
}
