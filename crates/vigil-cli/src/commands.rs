//! Subcommand implementations.
//!
//! Every submission runs the same validation the server does before anything
//! is sent, so a form with missing fields never reaches the network.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use bytes::Bytes;
use chrono::Utc;
use clap::{Args, ValueEnum};
use vigil_core::{
  attachment::{ACCEPTED_MEDIA_TYPES, Upload, accepted_media_type},
  form::{ContactForm, EmergencyForm, ReportForm},
  geocode::Coordinates,
};

use crate::{client::ApiClient, render};

// ─── Arguments ────────────────────────────────────────────────────────────────

/// Where the incident happened: an address or a coordinate pair.
#[derive(Args, Debug, Default)]
pub struct LocationArgs {
  /// Free-text location or address.
  #[arg(long, conflicts_with_all = ["lat", "lon"])]
  pub location: Option<String>,

  /// Latitude in decimal degrees; sent as "<lat>, <lon>".
  #[arg(long, requires = "lon", allow_negative_numbers = true)]
  pub lat: Option<f64>,

  /// Longitude in decimal degrees.
  #[arg(long, requires = "lat", allow_negative_numbers = true)]
  pub lon: Option<f64>,
}

impl LocationArgs {
  /// The location string to submit, if any was given.
  pub fn resolve(self) -> Result<Option<String>> {
    match (self.lat, self.lon) {
      (Some(lat), Some(lon)) => Coordinates::new(lat, lon)
        .map(|c| Some(c.to_location_string()))
        .ok_or_else(|| anyhow!("coordinates {lat}, {lon} are out of range")),
      _ => Ok(self.location),
    }
  }
}

#[derive(Args, Debug, Default)]
pub struct ReportArgs {
  #[command(flatten)]
  pub location:    LocationArgs,
  /// When it happened, e.g. 2025-03-01T21:15.
  #[arg(long)]
  pub datetime:    Option<String>,
  #[arg(long)]
  pub subject:     Option<String>,
  #[arg(long)]
  pub description: Option<String>,
  /// Your name; omit to report anonymously.
  #[arg(long)]
  pub name:        Option<String>,
  /// Phone number or other contact detail.
  #[arg(long)]
  pub contact:     Option<String>,
  #[arg(long)]
  pub email:       Option<String>,
  /// Photo or video to attach.
  #[arg(long, value_name = "PATH")]
  pub file:        Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct SosArgs {
  #[command(flatten)]
  pub location: LocationArgs,
  /// Captured photo or video; required.
  #[arg(long, value_name = "PATH")]
  pub file:     Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct ContactArgs {
  #[arg(long)]
  pub name:    Option<String>,
  #[arg(long)]
  pub subject: Option<String>,
  #[arg(long)]
  pub message: Option<String>,
  #[arg(long)]
  pub email:   Option<String>,
  #[arg(long)]
  pub contact: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
  #[default]
  Reports,
  Emergencies,
  Contacts,
}

// ─── Forms ────────────────────────────────────────────────────────────────────

impl ReportArgs {
  /// Build and validate the form. Returns it together with the attachment
  /// path, if one was given.
  pub fn into_form(self) -> Result<(ReportForm, Option<PathBuf>)> {
    let form = ReportForm {
      name:        self.name,
      location:    self.location.resolve()?,
      datetime:    self.datetime,
      subject:     self.subject,
      description: self.description,
      contact:     self.contact,
      email:       self.email,
    };
    form.clone().validate(Utc::now()).context("report not sent")?;
    Ok((form, self.file))
  }
}

impl SosArgs {
  pub fn into_form(self) -> Result<(String, PathBuf)> {
    let has_file = self.file.is_some();
    let location = EmergencyForm { location: self.location.resolve()? }
      .validate(has_file)
      .context("emergency not sent")?;
    let file = self.file.ok_or_else(|| anyhow!("emergency not sent: a file is required"))?;
    Ok((location, file))
  }
}

impl ContactArgs {
  pub fn into_form(self) -> Result<ContactForm> {
    let form = ContactForm {
      name:    self.name,
      subject: self.subject,
      message: self.message,
      email:   self.email,
      contact: self.contact,
    };
    form.clone().validate(Utc::now()).context("message not sent")?;
    Ok(form)
  }
}

/// Read an attachment from disk, refusing media types the server would
/// reject.
pub async fn load_upload(path: &Path) -> Result<Upload> {
  let name = path
    .file_name()
    .and_then(|n| n.to_str())
    .ok_or_else(|| anyhow!("{} has no usable file name", path.display()))?
    .to_owned();

  let Some(media_type) = accepted_media_type(None, &name) else {
    bail!(
      "{name}: unsupported file type (accepted: {})",
      ACCEPTED_MEDIA_TYPES.join(", ")
    );
  };

  let bytes = tokio::fs::read(path)
    .await
    .with_context(|| format!("reading {}", path.display()))?;
  tracing::debug!(%name, media_type, size = bytes.len(), "attachment loaded");
  Ok(Upload::new(name, Some(media_type.to_owned()), Bytes::from(bytes)))
}

// ─── Commands ─────────────────────────────────────────────────────────────────

pub async fn report(client: &ApiClient, args: ReportArgs) -> Result<()> {
  let (form, file) = args.into_form()?;
  let upload = match file {
    Some(path) => Some(load_upload(&path).await?),
    None => None,
  };
  let receipt = client.submit_report(&form, upload).await?;
  println!("{} (id {})", receipt.message, receipt.id);
  Ok(())
}

pub async fn sos(client: &ApiClient, args: SosArgs) -> Result<()> {
  let (location, file) = args.into_form()?;
  let upload = load_upload(&file).await?;
  let receipt = client.submit_emergency(&location, upload).await?;
  println!("{} (id {})", receipt.message, receipt.id);
  Ok(())
}

pub async fn contact(client: &ApiClient, args: ContactArgs) -> Result<()> {
  let form = args.into_form()?;
  let receipt = client.submit_contact(&form).await?;
  println!("{} (id {})", receipt.message, receipt.id);
  Ok(())
}

pub async fn dashboard(client: &ApiClient, view: View) -> Result<()> {
  let text = match view {
    View::Reports => render::reports(&client.list_reports().await?),
    View::Emergencies => render::emergencies(&client.list_emergencies().await?),
    View::Contacts => render::contacts(&client.list_contacts().await?),
  };
  print!("{text}");
  Ok(())
}
