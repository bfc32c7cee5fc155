use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use agrideal_relay::{router, RoomRegistry};

#[derive(Parser, Debug)]
#[command(name = "agrideal-relay", about = "Websocket relay for negotiation rooms")]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = 3001)]
    port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .context("invalid bind address")?;

    let registry = Arc::new(RoomRegistry::new());
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, "relay listening");
    axum::serve(listener, router(registry))
        .await
        .context("server error")?;
    Ok(())
}
