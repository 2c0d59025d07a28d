//! Handlers for `/api/monitor` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/monitor/start` | Body: `{"threshold"?, "contacts":[...], "location"?}`; 409 if running |
//! | `POST` | `/api/monitor/stop` | Idempotent; returns the final status |
//! | `GET`  | `/api/monitor/status` | `{"state","lastHeartRate","threshold"}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use vigil_core::geocode::Coordinates;

use super::{
  AlertSink, AlertTargets, DEFAULT_THRESHOLD, EmergencyContact, MonitorStatus,
  SimulatedSource, THRESHOLD_RANGE,
};
use crate::{
  AppState,
  error::{Error, Result},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
  pub threshold: Option<u16>,
  #[serde(default)]
  pub contacts:  Vec<EmergencyContact>,
  pub location:  Option<Coordinates>,
}

impl StartRequest {
  fn validate(self) -> Result<(u16, AlertTargets)> {
    let threshold = self.threshold.unwrap_or(DEFAULT_THRESHOLD);
    if !THRESHOLD_RANGE.contains(&threshold) {
      return Err(Error::BadRequest(format!(
        "threshold must be between {} and {} BPM",
        THRESHOLD_RANGE.start(),
        THRESHOLD_RANGE.end()
      )));
    }

    let contacts: Vec<_> = self
      .contacts
      .into_iter()
      .filter(|c| !c.name.trim().is_empty())
      .collect();
    if contacts.is_empty() {
      return Err(Error::BadRequest("at least one emergency contact is required".into()));
    }

    let location = match self.location {
      Some(at) => Some(
        Coordinates::new(at.latitude, at.longitude)
          .ok_or_else(|| Error::BadRequest("location is out of range".into()))?,
      ),
      None => None,
    };

    Ok((threshold, AlertTargets { contacts, location }))
  }
}

/// `POST /api/monitor/start`
pub async fn start<K: AlertSink>(
  State(state): State<Arc<AppState<K>>>,
  body: std::result::Result<Json<StartRequest>, JsonRejection>,
) -> Result<Json<MonitorStatus>> {
  let Json(req) = body.map_err(|e| Error::BadRequest(e.body_text()))?;
  let (threshold, targets) = req.validate()?;

  let mut slot = state.monitor.lock().await;
  if slot.as_ref().is_some_and(|m| m.is_running()) {
    return Err(Error::Conflict("monitoring is already active".into()));
  }
  // A previous run whose tasks already ended.
  if let Some(old) = slot.take() {
    old.stop().await;
  }

  let handle = super::spawn(
    state.config.monitor_settings(threshold),
    SimulatedSource,
    state.notifier.clone(),
    targets,
  );
  let status = handle.status();
  *slot = Some(handle);
  Ok(Json(status))
}

/// `POST /api/monitor/stop`
pub async fn stop<K: AlertSink>(State(state): State<Arc<AppState<K>>>) -> Json<MonitorStatus> {
  let handle = state.monitor.lock().await.take();
  let status = match handle {
    Some(handle) => handle.stop().await,
    None => MonitorStatus::inactive(DEFAULT_THRESHOLD),
  };
  Json(status)
}

/// `GET /api/monitor/status`
pub async fn status<K: AlertSink>(State(state): State<Arc<AppState<K>>>) -> Json<MonitorStatus> {
  let slot = state.monitor.lock().await;
  Json(match slot.as_ref() {
    Some(handle) => handle.status(),
    None => MonitorStatus::inactive(DEFAULT_THRESHOLD),
  })
}
