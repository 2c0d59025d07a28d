//! Alert delivery to emergency contacts.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use vigil_core::geocode::Coordinates;

// ─── Alert ───────────────────────────────────────────────────────────────────

/// Someone to notify when distress is detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
  pub name:             String,
  pub telegram_chat_id: Option<String>,
}

/// A distress alert ready for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
  pub heart_rate: u16,
  pub threshold:  u16,
  pub location:   Option<Coordinates>,
  pub contacts:   Vec<EmergencyContact>,
}

/// The message body sent to every contact.
pub fn alert_text(alert: &Alert) -> String {
  let location = match alert.location {
    Some(at) => format!("https://www.google.com/maps?q={},{}", at.latitude, at.longitude),
    None => "unknown".to_owned(),
  };
  format!(
    "EMERGENCY ALERT\n\nYour contact has detected a distress signal.\n\nDetails:\n\
     - Heart Rate: {} BPM\n- Threshold: {} BPM\n- Location: {location}",
    alert.heart_rate, alert.threshold
  )
}

#[derive(Debug, Error)]
pub enum AlertError {
  #[error("telegram request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{failed} of {attempted} notifications failed")]
  Partial { failed: usize, attempted: usize },
}

// ─── Sinks ───────────────────────────────────────────────────────────────────

/// Where alerts go.
pub trait AlertSink: Send + Sync + 'static {
  fn deliver(&self, alert: &Alert) -> impl Future<Output = Result<(), AlertError>> + Send;
}

/// Sends each alert through a Telegram bot to every contact with a chat id.
#[derive(Clone)]
pub struct TelegramSink {
  http:      reqwest::Client,
  api_base:  String,
  bot_token: String,
}

impl TelegramSink {
  pub fn new(api_base: &str, bot_token: impl Into<String>) -> Self {
    Self {
      http:      reqwest::Client::new(),
      api_base:  api_base.trim_end_matches('/').to_owned(),
      bot_token: bot_token.into(),
    }
  }

  async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), reqwest::Error> {
    let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);
    self
      .http
      .post(url)
      .json(&json!({ "chat_id": chat_id, "text": text }))
      .send()
      .await?
      .error_for_status()?;
    Ok(())
  }
}

impl AlertSink for TelegramSink {
  async fn deliver(&self, alert: &Alert) -> Result<(), AlertError> {
    let text = alert_text(alert);
    let mut attempted = 0;
    let mut failed = 0;

    for contact in &alert.contacts {
      let Some(chat_id) = contact.telegram_chat_id.as_deref() else {
        continue;
      };
      attempted += 1;
      match self.send_message(chat_id, &text).await {
        Ok(()) => tracing::info!(contact = %contact.name, "alert delivered"),
        Err(e) => {
          failed += 1;
          // The bot token is part of the URL; strip it before logging.
          tracing::error!(contact = %contact.name, "alert delivery failed: {}", e.without_url());
        }
      }
    }

    if attempted == 0 {
      tracing::warn!("no contact has a telegram chat id; alert not sent anywhere");
    }
    if failed > 0 {
      return Err(AlertError::Partial { failed, attempted });
    }
    Ok(())
  }
}

/// Logs alerts instead of sending them; used when no bot token is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl AlertSink for LogSink {
  async fn deliver(&self, alert: &Alert) -> Result<(), AlertError> {
    tracing::warn!(
      heart_rate = alert.heart_rate,
      threshold = alert.threshold,
      contacts = alert.contacts.len(),
      "distress alert (no delivery channel configured)"
    );
    Ok(())
  }
}

/// The sink chosen at startup.
#[derive(Clone)]
pub enum Notifier {
  Telegram(TelegramSink),
  Log(LogSink),
}

impl Notifier {
  /// Telegram when a bot token is configured, logging otherwise.
  pub fn from_config(api_base: &str, bot_token: Option<&str>) -> Self {
    match bot_token.filter(|t| !t.is_empty()) {
      Some(token) => Self::Telegram(TelegramSink::new(api_base, token)),
      None => Self::Log(LogSink),
    }
  }
}

impl AlertSink for Notifier {
  async fn deliver(&self, alert: &Alert) -> Result<(), AlertError> {
    match self {
      Self::Telegram(sink) => sink.deliver(alert).await,
      Self::Log(sink) => sink.deliver(alert).await,
    }
  }
}
