//! Webchat panel terminal client
//!
//! Entry point: talks to a chat server from the terminal.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use webchat_panel::config::{AppConfig, Cli};
use webchat_panel::panel::memory::{MemoryFilePicker, MemoryInput};
use webchat_panel::terminal::{HELP_TEXT, StderrNotifier, TerminalHost, TerminalTranscript};
use webchat_panel::{ChatPanel, HttpTransport, PanelHandles};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let cli = Cli::parse();
    let config = AppConfig::from_cli(&cli)?;

    init_tracing(config.logging.json);

    let transport = Arc::new(HttpTransport::from_config(&config)?);
    info!(
        name: "client.config.loaded",
        chat_url = %transport.chat_url(),
        upload_url = %transport.upload_url(),
        timeout_secs = ?config.client.request_timeout_secs,
        "Chat client configured"
    );

    let input = Arc::new(MemoryInput::new());
    let file_input = Arc::new(MemoryFilePicker::new());
    let handles = PanelHandles {
        input: Arc::clone(&input) as _,
        chat: Arc::new(TerminalTranscript::stdout()),
        file_input: Arc::clone(&file_input) as _,
        notifier: Arc::new(StderrNotifier),
    };
    let panel = ChatPanel::new(handles, transport);

    println!("{HELP_TEXT}");
    let mut host = TerminalHost::new(panel, input, file_input);
    host.run(BufReader::new(tokio::io::stdin())).await?;

    Ok(())
}

/// Structured logs to stderr (M-LOG-STRUCTURED); stdout carries the chat.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
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
