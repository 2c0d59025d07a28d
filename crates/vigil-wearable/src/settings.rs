//! Runtime configuration for the wearable service.

use std::{path::Path, time::Duration};

use serde::Deserialize;

use crate::monitor::MonitorSettings;

/// Deserialised from `config.toml` layered under `VIGIL_*` environment
/// variables. Holds OAuth and bot secrets, so it is never logged.
#[derive(Clone, Deserialize)]
pub struct WearableConfig {
  #[serde(default = "default_host")]
  pub host:                   String,
  #[serde(default = "default_port")]
  pub port:                   u16,
  pub fitbit_client_id:       Option<String>,
  pub fitbit_client_secret:   Option<String>,
  pub fitbit_redirect_uri:    Option<String>,
  #[serde(default = "default_fitbit_token_url")]
  pub fitbit_token_url:       String,
  #[serde(default = "default_fitbit_api_base")]
  pub fitbit_api_base:        String,
  /// Without a bot token alerts are only logged.
  pub telegram_bot_token:     Option<String>,
  #[serde(default = "default_telegram_api_base")]
  pub telegram_api_base:      String,
  #[serde(default = "default_monitor_interval_secs")]
  pub monitor_interval_secs:  u64,
  #[serde(default = "default_monitor_queue_capacity")]
  pub monitor_queue_capacity: usize,
  #[serde(default = "default_alert_rearm_secs")]
  pub alert_rearm_secs:       u64,
}

fn default_host() -> String { "0.0.0.0".to_owned() }
fn default_port() -> u16 { 5001 }
fn default_fitbit_token_url() -> String { "https://api.fitbit.com/oauth2/token".to_owned() }
fn default_fitbit_api_base() -> String { "https://api.fitbit.com".to_owned() }
fn default_telegram_api_base() -> String { "https://api.telegram.org".to_owned() }
fn default_monitor_interval_secs() -> u64 { 30 }
fn default_monitor_queue_capacity() -> usize { 16 }
fn default_alert_rearm_secs() -> u64 { 300 }

impl WearableConfig {
  /// Load from an optional TOML file at `path`, then the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("VIGIL").try_parsing(true))
      .build()?
      .try_deserialize()
  }

  /// Monitor timing for a run with the given alert `threshold`.
  pub fn monitor_settings(&self, threshold: u16) -> MonitorSettings {
    MonitorSettings {
      interval: Duration::from_secs(self.monitor_interval_secs.max(1)),
      queue_capacity: self.monitor_queue_capacity.max(1),
      rearm_after: Duration::from_secs(self.alert_rearm_secs),
      threshold,
    }
  }
}

#[cfg(test)]
mod tests {
  use config::{Config, File, FileFormat};

  use super::*;

  fn parse(toml: &str) -> WearableConfig {
    Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn defaults() {
    let cfg = parse("");
    assert_eq!(cfg.port, 5001);
    assert!(cfg.fitbit_client_id.is_none());
    assert!(cfg.telegram_bot_token.is_none());
    assert_eq!(cfg.fitbit_token_url, "https://api.fitbit.com/oauth2/token");

    let m = cfg.monitor_settings(120);
    assert_eq!(m.interval, Duration::from_secs(30));
    assert_eq!(m.queue_capacity, 16);
    assert_eq!(m.rearm_after, Duration::from_secs(300));
  }

  #[test]
  fn zero_capacity_is_clamped() {
    let cfg = parse("monitor_queue_capacity = 0\nmonitor_interval_secs = 0");
    let m = cfg.monitor_settings(100);
    assert_eq!(m.queue_capacity, 1);
    assert_eq!(m.interval, Duration::from_secs(1));
  }
}
