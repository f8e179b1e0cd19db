//! Discussion forum REST API.
//!
//! # Architecture Overview
//!
//! ```text
//!   Browser ──▶ edge-proxy (/api/*) ──▶ forum-api ──▶ PostgreSQL
//!                                          │
//!                                          ├─ http::validation  (ids, text)
//!                                          ├─ http::handlers    (one statement each)
//!                                          └─ store::ForumStore (PgStore | MemoryStore)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use discussion_forum::config::load_config;
use discussion_forum::lifecycle::{shutdown_on_signal, Shutdown};
use discussion_forum::observability::{logging, metrics};
use discussion_forum::store::{ForumStore, MemoryStore, PgStore};
use discussion_forum::ApiServer;

#[derive(Parser)]
#[command(name = "forum-api")]
#[command(about = "REST API for the discussion forum", long_about = None)]
struct Cli {
    /// TOML configuration file (optional; env vars still apply).
    #[arg(short, long, env = "FORUM_CONFIG")]
    config: Option<PathBuf>,

    /// Keep data in process memory instead of PostgreSQL.
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    logging::init(&config.observability);
    tracing::info!("forum-api v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        database = ?config.database,
        strict_not_found = config.api.strict_not_found,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?);
    }

    let store: Arc<dyn ForumStore> = if cli.in_memory {
        tracing::warn!("Using in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(PgStore::connect(&config.database).await?)
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server = ApiServer::new(config, store);
    let server_shutdown = shutdown.subscribe();
    let mut serve = tokio::spawn(server.run(listener, server_shutdown));

    tokio::select! {
        result = &mut serve => result??,
        _ = shutdown_on_signal(&shutdown) => serve.await??,
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
