//! `vigil`: command-line client for the Vigil report service.
//!
//! # Usage
//!
//! ```text
//! vigil report --lat 12.97 --lon 77.59 --datetime 2025-03-01T21:15 \
//!   --subject Harassment --description "Followed near the bus stop" --file photo.jpg
//! vigil sos --location "Central station" --file clip.mp4
//! vigil contact --name A --subject S --message M --email a@b.com
//! vigil --url http://vigil.local:5000 dashboard emergencies
//! ```

mod client;
mod commands;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::ApiClient;
use commands::{ContactArgs, ReportArgs, SosArgs, View};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:5000";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "vigil", version, about = "Submit and review Vigil incident reports")]
struct Cli {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the report server (default: http://localhost:5000).
  #[arg(long, env = "VIGIL_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// File an incident report.
  Report(ReportArgs),
  /// Send an emergency with captured media.
  Sos(SosArgs),
  /// Send a message through the contact form.
  Contact(ContactArgs),
  /// List submitted records.
  Dashboard {
    #[arg(value_enum, default_value_t = View::Reports)]
    view: View,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

fn load_config(path: Option<&PathBuf>) -> Result<ConfigFile> {
  let Some(path) = path else {
    return Ok(ConfigFile::default());
  };
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading config file {}", path.display()))?;
  toml::from_str(&raw).context("parsing config file")
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  // Diagnostics go to stderr so listings can be piped.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let file_cfg = load_config(cli.config.as_ref())?;

  // CLI flag / env var, then config file, then default.
  let base_url = cli
    .url
    .or_else(|| (!file_cfg.url.is_empty()).then_some(file_cfg.url))
    .unwrap_or_else(|| DEFAULT_URL.to_string());
  tracing::debug!(%base_url, "using report server");

  let client = ApiClient::new(base_url)?;

  match cli.command {
    Command::Report(args) => commands::report(&client, args).await,
    Command::Sos(args) => commands::sos(&client, args).await,
    Command::Contact(args) => commands::contact(&client, args).await,
    Command::Dashboard { view } => commands::dashboard(&client, view).await,
  }
}
