//! vigil-wearable binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) and serves the
//! wearable companion API over HTTP until SIGINT or SIGTERM.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use vigil_wearable::{
  AppState,
  monitor::sink::Notifier,
  settings::WearableConfig,
};

#[derive(Parser)]
#[command(author, version, about = "Vigil wearable companion service")]
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
  let cfg = WearableConfig::load(&cli.config).context("failed to load configuration")?;

  tracing::info!(
    client_id_set = cfg.fitbit_client_id.is_some(),
    client_secret_set = cfg.fitbit_client_secret.is_some(),
    redirect_uri_set = cfg.fitbit_redirect_uri.is_some(),
    "provider credentials"
  );

  let notifier = Notifier::from_config(&cfg.telegram_api_base, cfg.telegram_bot_token.as_deref());
  if matches!(notifier, Notifier::Log(_)) {
    tracing::warn!("no telegram_bot_token configured; distress alerts will only be logged");
  }

  let address = format!("{}:{}", cfg.host, cfg.port);
  let state = Arc::new(AppState::new(cfg, notifier));
  let app = vigil_wearable::router(state.clone());

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("shutting down");
  state.shutdown().await;

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
