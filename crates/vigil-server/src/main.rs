//! vigil-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite record store and the uploads directory, and serves the report API
//! over HTTP until SIGINT or SIGTERM.

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use vigil_api::{NominatimGeocoder, RouterOptions};
use vigil_files::LocalAttachmentStore;
use vigil_store_sqlite::SqliteStore;

use crate::settings::{ServerConfig, expand_tilde};

#[derive(Parser)]
#[command(author, version, about = "Vigil incident report server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let cfg = ServerConfig::load(&cli.config).context("failed to load configuration")?;

  let database_path = expand_tilde(&cfg.database_path);
  let uploads_dir = expand_tilde(&cfg.uploads_dir);

  // Open SQLite store.
  let store = Arc::new(
    SqliteStore::open(&database_path)
      .await
      .with_context(|| format!("failed to open store at {database_path:?}"))?,
  );

  tokio::fs::create_dir_all(&uploads_dir)
    .await
    .with_context(|| format!("failed to create uploads directory {uploads_dir:?}"))?;

  let app = vigil_api::router(
    store.clone(),
    Arc::new(LocalAttachmentStore::new(&uploads_dir)),
    Arc::new(NominatimGeocoder::new(&cfg.geocoder_url)),
    RouterOptions { uploads_dir, max_upload_bytes: cfg.max_upload_bytes },
  );
  let address = format!("{}:{}", cfg.host, cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("shutting down");
  match Arc::try_unwrap(store) {
    Ok(store) => store.close().await.context("failed to close record store")?,
    Err(_) => tracing::warn!("record store still in use at shutdown; not closed explicitly"),
  }

  Ok(())
}

/// Resolve on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!("failed to listen for ctrl-c: {e}");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    use tokio::signal::unix::{SignalKind, signal};
    match signal(SignalKind::terminate()) {
      Ok(mut sigterm) => {
        sigterm.recv().await;
      }
      Err(e) => {
        tracing::error!("failed to listen for SIGTERM: {e}");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {}
    _ = terminate => {}
  }
}
