use std::{sync::Arc, time::Duration};

use animetrace_core::{
    AnimeTracePlugin,
    format::{Reply, ReplyPart},
};
use animetrace_extensions::{
    animetrace::{AnimeTraceClient, AnimeTraceConfig},
    store::JsonFileConfigStore,
};
use anyhow::Context;
use console::style;
use tracing::debug;

use crate::cli::Cli;

mod chat;
pub use chat::chat;

pub struct AppContext {
    pub plugin: Arc<AnimeTracePlugin>,
}

impl AppContext {
    pub fn new(plugin: AnimeTracePlugin) -> Self {
        Self {
            plugin: Arc::new(plugin),
        }
    }

    /// Wires the HTTP client and the settings file named on the command line into a plugin.
    pub async fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = AnimeTraceConfig::new()?.timeout(Duration::from_secs(cli.timeout));
        if let Some(url) = cli.api_url.as_deref() {
            config = config.base_url(url)?;
        }
        debug!(?config, "Client configuration");
        let client = AnimeTraceClient::new_with_config(config, None)?;

        let store = JsonFileConfigStore::new(&cli.config);
        let plugin = AnimeTracePlugin::load(Arc::new(client), Arc::new(store))
            .await
            .with_context(|| format!("Failed to load settings from {}", cli.config.display()))?;
        Ok(Self::new(plugin))
    }
}

/// Renders a reply for the terminal. Images are shown as a dimmed marker line.
pub fn render_reply(reply: &Reply) -> String {
    reply
        .parts
        .iter()
        .map(|part| match part {
            ReplyPart::Text(text) => text.clone(),
            ReplyPart::Image(image) => format!("{}\n", style(format!("[image: {}]", image)).dim()),
        })
        .collect()
}
