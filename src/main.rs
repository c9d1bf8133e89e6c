// src/main.rs
use crate::config::AppConfig;
use crate::connectors::poller::PricePoller;
use crate::connectors::proxy::ProxyClient;
use crate::desk::engine::TradeDesk;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod connectors;
mod desk;
mod error;
mod server;
#[cfg(test)]
mod test_support;
mod tui;
mod types;
mod utils;

#[derive(Parser)]
#[command(name = "paper_desk", version, about = "Paper-trading desk over a live coin price proxy")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the price proxy and the shared simulated account.
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Open the terminal desk, reading prices through the proxy.
    Desk {
        #[arg(long)]
        proxy_url: Option<String>,
    },
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();
    let mut config = AppConfig::new()?;

    match cli.command {
        Command::Serve { port } => {
            tracing_subscriber::fmt().with_env_filter(env_filter()).init();
            if let Some(port) = port {
                config.server.port = port;
            }
            info!(
                "Paper desk proxy: coins {:?}, poll every {:?}",
                config.feed.coins,
                config.feed.poll_interval()
            );
            server::run_server(config).await
        }
        Command::Desk { proxy_url } => {
            // The TUI owns the terminal, so logs go to a file.
            let file_appender = tracing_appender::rolling::daily("logs", "paper_desk.log");
            let (writer, _guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(writer)
                .with_ansi(false)
                .init();

            if let Some(url) = proxy_url {
                config.feed.proxy_url = url;
            }
            info!("Desk starting against proxy {}", config.feed.proxy_url);

            let source = Arc::new(ProxyClient::new(&config.feed.proxy_url)?);
            let (feed_tx, feed_rx) = mpsc::channel(16);
            let poller = PricePoller::spawn(source, config.feed.poll_interval(), feed_tx);

            let desk = TradeDesk::new(config.trading.clone());
            let result = tui::run(desk, feed_rx).await;

            poller.shutdown();
            result
        }
    }
}
