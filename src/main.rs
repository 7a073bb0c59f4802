//! Kanbot entry point — wires the Trello adapter, the monitor, the mood log,
//! and a message sink together, then either runs one command or starts the
//! bot loop.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use kanbot_channels::{Command, CommandHandler, ConsoleSink, WebhookSink};
use kanbot_core::config::KanbotConfig;
use kanbot_core::traits::MessageSink;
use kanbot_monitor::Monitor;
use kanbot_mood::MoodEngine;
use kanbot_trello::TrelloClient;

#[derive(Parser)]
#[command(name = "kanbot", version, about = "Board-watching chat bot")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot: periodic sweeps plus a stdin command loop.
    Run,
    /// Print one summary block per monitored board.
    Boards,
    /// Run one overflow sweep and print the messages.
    CheckOverflow,
    /// Run one archive sweep and print the messages.
    CheckArchive,
    /// Check service connectivity.
    Ping,
    /// Print unread recent notifications.
    Recent,
}

fn build_monitor(config: &KanbotConfig) -> Arc<Monitor> {
    let client = TrelloClient::new(&config.api_key, &config.api_token, &config.organization);
    let sink: Arc<dyn MessageSink> = if config.webhook_url.is_empty() {
        Arc::new(ConsoleSink)
    } else {
        Arc::new(WebhookSink::new(&config.webhook_url))
    };
    Arc::new(Monitor::new(Arc::new(client), sink, config.clone()))
}

fn invoker() -> String {
    std::env::var("USER").unwrap_or_else(|_| "anon".into())
}

async fn run_bot(config: KanbotConfig) -> Result<()> {
    config.warn_missing();
    let monitor = build_monitor(&config);
    let moods = Arc::new(MoodEngine::open(Path::new(&config.mood_db_path))?);
    let handler = CommandHandler::new(Arc::clone(&monitor), moods);

    monitor.spawn_checkers();
    tracing::info!("kanbot ready; reading commands from stdin");

    let user = invoker();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = Command::parse(&line) else {
            continue;
        };
        for reply in handler.handle(command, &user).await {
            println!("{reply}");
        }
    }
    Ok(())
}

async fn run_one(config: KanbotConfig, command: Command) -> Result<()> {
    config.warn_missing();
    let monitor = build_monitor(&config);
    let moods = Arc::new(MoodEngine::open_in_memory()?);
    let handler = CommandHandler::new(monitor, moods);
    for reply in handler.handle(command, &invoker()).await {
        println!("{reply}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = KanbotConfig::load()?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_bot(config).await,
        Commands::Boards => run_one(config, Command::Boards).await,
        Commands::CheckOverflow => run_one(config, Command::CheckOverflow).await,
        Commands::CheckArchive => run_one(config, Command::CheckArchive).await,
        Commands::Ping => run_one(config, Command::Ping).await,
        Commands::Recent => run_one(config, Command::Recent).await,
    }
}
