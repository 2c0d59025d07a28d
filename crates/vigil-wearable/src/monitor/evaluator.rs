//! Threshold evaluation with a single alert per distress episode.

use std::time::Duration;

use tokio::time::Instant;

/// What a reading means for the person wearing the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
  /// At or below the threshold.
  Normal,
  /// Above the threshold, but an alert is already out or not yet re-armed.
  Elevated,
  /// Above the threshold and alerting is armed: notify contacts now.
  Alert,
}

/// Tracks distress state across readings.
///
/// A reading above the threshold raises one alert and enters distress. A
/// later reading at or below the threshold leaves distress, and alerting
/// re-arms once `rearm_after` has passed.
#[derive(Debug)]
pub struct AlertEvaluator {
  threshold:   u16,
  rearm_after: Duration,
  distress:    bool,
  alerted:     bool,
  rearm_at:    Option<Instant>,
}

impl AlertEvaluator {
  pub fn new(threshold: u16, rearm_after: Duration) -> Self {
    Self { threshold, rearm_after, distress: false, alerted: false, rearm_at: None }
  }

  pub fn threshold(&self) -> u16 { self.threshold }

  pub fn in_distress(&self) -> bool { self.distress }

  pub fn observe(&mut self, bpm: u16, now: Instant) -> Verdict {
    if self.rearm_at.is_some_and(|at| now >= at) {
      self.alerted = false;
      self.rearm_at = None;
    }

    if bpm > self.threshold {
      if self.distress || self.alerted {
        return Verdict::Elevated;
      }
      self.distress = true;
      self.alerted = true;
      return Verdict::Alert;
    }

    if self.distress {
      self.distress = false;
      self.rearm_at = Some(now + self.rearm_after);
    }
    Verdict::Normal
  }
}
