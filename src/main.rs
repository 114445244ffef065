//! Chat widget backend and terminal client.
//!
//! `chat-widget serve` runs the backend; `chat-widget chat` chats against a
//! running backend from the terminal.

use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use mimalloc::MiMalloc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use chat_widget::config::{AppConfig, Cli, Command};
use chat_widget::{server, terminal};

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let cli = Cli::parse();
    let config = AppConfig::from_cli(&cli)?;

    init_tracing(config.logging.json);

    match cli.command.clone().unwrap_or_default() {
        Command::Serve => server::start_server(Arc::new(config)).await,
        Command::Chat { url } => terminal::run(&config, &url).await,
    }
}

/// Initialize tracing (M-LOG-STRUCTURED). Logs go to stderr so the terminal
/// client's stdout only carries chat lines.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
