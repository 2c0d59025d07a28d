//! Wearable-device companion service for Vigil.
//!
//! Brokers the fitness provider's OAuth code exchange, proxies user data
//! requests, and runs the heart-rate distress monitor that alerts emergency
//! contacts.

pub mod error;
pub mod fitbit;
pub mod monitor;
pub mod settings;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use error::{Error, Result};
use fitbit::FitbitClient;
use monitor::{MonitorHandle, sink::AlertSink};
use settings::WearableConfig;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<K> {
  pub config:   WearableConfig,
  pub fitbit:   FitbitClient,
  pub notifier: Arc<K>,
  /// At most one monitor runs at a time.
  pub monitor:  Mutex<Option<MonitorHandle>>,
}

impl<K: AlertSink> AppState<K> {
  pub fn new(config: WearableConfig, notifier: K) -> Self {
    Self {
      fitbit: FitbitClient::new(&config),
      config,
      notifier: Arc::new(notifier),
      monitor: Mutex::new(None),
    }
  }

  /// Stop the monitor if one is running.
  pub async fn shutdown(&self) {
    if let Some(handle) = self.monitor.lock().await.take() {
      handle.stop().await;
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

pub fn router<K: AlertSink>(state: Arc<AppState<K>>) -> Router {
  Router::new()
    .route("/api/fitbit/token", post(fitbit::token::<K>))
    .route("/api/fitbit/data", get(fitbit::data::<K>))
    .route("/api/test", get(fitbit::test::<K>))
    .route("/api/monitor/start", post(monitor::routes::start::<K>))
    .route("/api/monitor/stop", post(monitor::routes::stop::<K>))
    .route("/api/monitor/status", get(monitor::routes::status::<K>))
    .with_state(state)
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
}
