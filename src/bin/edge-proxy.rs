//! Browser-facing edge proxy: forwards `/api/*` to the API service.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use discussion_forum::config::load_config;
use discussion_forum::lifecycle::{shutdown_on_signal, Shutdown};
use discussion_forum::observability::{logging, metrics};
use discussion_forum::EdgeProxy;

#[derive(Parser)]
#[command(name = "edge-proxy")]
#[command(about = "Forward /api requests to the forum API", long_about = None)]
struct Cli {
    /// TOML configuration file (optional; env vars still apply).
    #[arg(short, long, env = "FORUM_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    logging::init(&config.observability);
    tracing::info!(
        bind_address = %config.proxy.bind_address,
        upstream = %config.proxy.upstream,
        forward_headers = ?config.proxy.forward_headers,
        "edge-proxy v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?);
    }

    let listener = TcpListener::bind(&config.proxy.bind_address).await?;

    let shutdown = Shutdown::new();
    let proxy = EdgeProxy::new(config)?;
    let mut serve = tokio::spawn(proxy.run(listener, shutdown.subscribe()));

    tokio::select! {
        result = &mut serve => result??,
        _ = shutdown_on_signal(&shutdown) => serve.await??,
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
