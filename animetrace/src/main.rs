use anyhow::Result;
use animetrace::cli::{Cli, Commands};
use animetrace::{AppContext, commands};
use animetrace_core::command::Command;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok(); // Load .env file if present

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let cx = AppContext::from_cli(&cli).await?;

    // Match the command and call the appropriate handler function
    match cli.command {
        Commands::Recognize(args) => commands::handle_recognize(args, &cx).await?,
        Commands::Num { count } => commands::handle_setting(Command::Num(count), &cx).await?,
        Commands::Ai { mode } => commands::handle_setting(Command::Ai(mode), &cx).await?,
        Commands::Model { name } => commands::handle_setting(Command::Model(name), &cx).await?,
        Commands::Help => commands::handle_help(&cx).await?,
        Commands::Chat(args) => commands::handle_chat(args, &cx).await?,
        Commands::Config => commands::handle_config(&cx, &cli.config).await?,
    }

    Ok(())
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose == 0 {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_writer(std::io::stderr)
        .init();
}
