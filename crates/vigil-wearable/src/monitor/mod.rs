//! Heart-rate distress monitor.
//!
//! A producer task samples a [`HeartRateSource`] on a fixed interval and
//! pushes readings into a bounded queue. A consumer task drains the queue
//! through an [`AlertEvaluator`] and hands alerts to an [`AlertSink`]. Both
//! tasks end when the stop signal fires; the consumer publishes its state on a
//! `watch` channel.

pub mod evaluator;
pub mod routes;
pub mod sink;
pub mod source;

use std::{sync::Arc, time::Duration};

use serde::Serialize;
use tokio::{
  sync::{
    mpsc::{self, error::TrySendError},
    watch,
  },
  task::JoinHandle,
  time::{Instant, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};
use vigil_core::geocode::Coordinates;

pub use evaluator::{AlertEvaluator, Verdict};
pub use sink::{Alert, AlertSink, EmergencyContact};
pub use source::{HeartRateSource, SimulatedSource};

/// Alert threshold used when a start request names none.
pub const DEFAULT_THRESHOLD: u16 = 120;

/// Thresholds a client may choose.
pub const THRESHOLD_RANGE: std::ops::RangeInclusive<u16> = 60..=220;

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorState {
  Inactive,
  Active,
  AlertSent,
  AlertFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStatus {
  pub state:           MonitorState,
  pub last_heart_rate: Option<u16>,
  pub threshold:       u16,
}

impl MonitorStatus {
  pub fn inactive(threshold: u16) -> Self {
    Self { state: MonitorState::Inactive, last_heart_rate: None, threshold }
  }
}

// ─── Settings ────────────────────────────────────────────────────────────────

/// Timing and sizing for one monitor run.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
  /// Time between samples; the first sample is taken immediately.
  pub interval:       Duration,
  /// Readings buffered between producer and consumer.
  pub queue_capacity: usize,
  /// Delay after distress clears before another alert may fire.
  pub rearm_after:    Duration,
  pub threshold:      u16,
}

/// Who to alert and where the wearer is.
#[derive(Debug, Clone)]
pub struct AlertTargets {
  pub contacts: Vec<EmergencyContact>,
  pub location: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy)]
struct Reading {
  bpm: u16,
  at:  Instant,
}

// ─── Monitor ─────────────────────────────────────────────────────────────────

/// A running monitor. Dropping the handle without calling [`stop`] leaves
/// both tasks running until the queue closes.
///
/// [`stop`]: MonitorHandle::stop
#[derive(Debug)]
pub struct MonitorHandle {
  stop:     watch::Sender<bool>,
  status:   watch::Receiver<MonitorStatus>,
  producer: JoinHandle<()>,
  consumer: JoinHandle<()>,
}

/// Start a monitor run on the current tokio runtime.
pub fn spawn<Src, K>(
  settings: MonitorSettings,
  source: Src,
  sink: Arc<K>,
  targets: AlertTargets,
) -> MonitorHandle
where
  Src: HeartRateSource,
  K: AlertSink,
{
  let (stop_tx, stop_rx) = watch::channel(false);
  let (queue_tx, queue_rx) = mpsc::channel(settings.queue_capacity.max(1));
  let (status_tx, status_rx) = watch::channel(MonitorStatus {
    state:           MonitorState::Active,
    last_heart_rate: None,
    threshold:       settings.threshold,
  });

  info!(
    threshold = settings.threshold,
    interval_ms = settings.interval.as_millis() as u64,
    contacts = targets.contacts.len(),
    "heart-rate monitor started"
  );

  let evaluator = AlertEvaluator::new(settings.threshold, settings.rearm_after);
  let producer = tokio::spawn(produce(source, settings.interval, queue_tx, stop_rx.clone()));
  let consumer = tokio::spawn(consume(queue_rx, evaluator, sink, targets, status_tx, stop_rx));

  MonitorHandle { stop: stop_tx, status: status_rx, producer, consumer }
}

impl MonitorHandle {
  /// The latest published status.
  pub fn status(&self) -> MonitorStatus { self.status.borrow().clone() }

  /// A receiver that observes every status change.
  pub fn subscribe(&self) -> watch::Receiver<MonitorStatus> { self.status.clone() }

  /// `false` once the consumer has exited.
  pub fn is_running(&self) -> bool { !self.consumer.is_finished() }

  /// Signal both tasks, wait for them, and return the final status.
  pub async fn stop(self) -> MonitorStatus {
    let _ = self.stop.send(true);
    for (name, task) in [("producer", self.producer), ("consumer", self.consumer)] {
      if let Err(e) = task.await {
        error!("monitor {name} task failed: {e}");
      }
    }
    info!("heart-rate monitor stopped");
    self.status.borrow().clone()
  }
}

// ─── Tasks ───────────────────────────────────────────────────────────────────

async fn produce<Src: HeartRateSource>(
  mut source: Src,
  period: Duration,
  queue: mpsc::Sender<Reading>,
  mut stop: watch::Receiver<bool>,
) {
  let mut ticker = tokio::time::interval(period);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

  loop {
    tokio::select! {
      biased;
      _ = stop.changed() => break,
      _ = ticker.tick() => {}
    }

    let Some(bpm) = source.sample().await else {
      debug!("no heart-rate reading available");
      continue;
    };

    match queue.try_send(Reading { bpm, at: Instant::now() }) {
      Ok(()) => {}
      Err(TrySendError::Full(r)) => debug!(bpm = r.bpm, "monitor queue full, dropping reading"),
      Err(TrySendError::Closed(_)) => break,
    }
  }

  debug!("heart-rate producer stopped");
}

async fn consume<K: AlertSink>(
  mut queue: mpsc::Receiver<Reading>,
  mut evaluator: AlertEvaluator,
  sink: Arc<K>,
  targets: AlertTargets,
  status: watch::Sender<MonitorStatus>,
  mut stop: watch::Receiver<bool>,
) {
  loop {
    let reading = tokio::select! {
      biased;
      _ = stop.changed() => break,
      r = queue.recv() => match r {
        Some(r) => r,
        None => break,
      },
    };

    status.send_modify(|s| s.last_heart_rate = Some(reading.bpm));

    match evaluator.observe(reading.bpm, reading.at) {
      Verdict::Normal => debug!(bpm = reading.bpm, "heart rate normal"),
      Verdict::Elevated => debug!(bpm = reading.bpm, "heart rate still elevated"),
      Verdict::Alert => {
        warn!(bpm = reading.bpm, threshold = evaluator.threshold(), "distress detected");
        let alert = Alert {
          heart_rate: reading.bpm,
          threshold:  evaluator.threshold(),
          location:   targets.location,
          contacts:   targets.contacts.clone(),
        };
        let state = match sink.deliver(&alert).await {
          Ok(()) => MonitorState::AlertSent,
          Err(e) => {
            error!("failed to deliver distress alert: {e}");
            MonitorState::AlertFailed
          }
        };
        status.send_modify(|s| s.state = state);
      }
    }
  }

  status.send_modify(|s| s.state = MonitorState::Inactive);
  debug!("heart-rate consumer stopped");
}
