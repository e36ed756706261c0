//! clinic-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), connects to Redis
//! (or an in-process store with `--in-memory`), initialises the identifier
//! counters if this is a fresh store, and serves the JSON API over HTTP.

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use clinic_core::{KvStore, MemoryStore, Registry};
use clinic_store_redis::RedisStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Clinic record service")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Keep all data in process memory instead of Redis. Nothing survives a
  /// restart.
  #[arg(long)]
  in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;

  if cli.in_memory {
    tracing::warn!("using in-memory store; data is lost on exit");
    serve(MemoryStore::new(), &server_cfg).await
  } else {
    let store = RedisStore::connect(&server_cfg.redis_url)
      .await
      .with_context(|| format!("failed to connect to {}", server_cfg.redis_url))?;
    serve(store, &server_cfg).await
  }
}

async fn serve<S>(store: S, server_cfg: &ServerConfig) -> anyhow::Result<()>
where
  S: KvStore + 'static,
{
  let registry = Arc::new(Registry::new(Arc::new(store)));
  registry
    .bootstrap()
    .await
    .context("failed to initialise store")?;

  let app = clinic_api::api_router(registry).layer(TraceLayer::new_for_http());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
