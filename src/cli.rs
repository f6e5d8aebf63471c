//! Chat Relay - Terminal Client
//!
//! Reads lines from stdin, sends the whole conversation over the relay's
//! WebSocket and prints assistant replies. Reconnects every 2 seconds while
//! the relay is unreachable.

use anyhow::Result;
use chat_relay::client::{ChatClient, TerminalView};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "chat")]
#[command(about = "Terminal client for the chat relay")]
struct Cli {
    /// Relay WebSocket URL
    #[arg(long, env = "CHAT_RELAY_URL", default_value = "ws://localhost:8787/ws")]
    url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so they don't interleave with the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut view = TerminalView::stdout();
    let mut client = ChatClient::new(cli.url);
    client.run(&mut line_rx, &mut view).await?;

    Ok(())
}
