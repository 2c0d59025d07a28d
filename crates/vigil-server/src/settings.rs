//! Runtime configuration for the report service.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Deserialised from `config.toml` layered under `VIGIL_*` environment
/// variables. Every key has a default, so an empty source is valid.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:             String,
  #[serde(default = "default_port")]
  pub port:             u16,
  /// SQLite file; `:memory:` keeps everything in RAM.
  #[serde(default = "default_database_path")]
  pub database_path:    PathBuf,
  #[serde(default = "default_uploads_dir")]
  pub uploads_dir:      PathBuf,
  #[serde(default = "default_max_upload_bytes")]
  pub max_upload_bytes: usize,
  #[serde(default = "default_geocoder_url")]
  pub geocoder_url:     String,
}

fn default_host() -> String { "0.0.0.0".to_owned() }
fn default_port() -> u16 { 5000 }
fn default_database_path() -> PathBuf { PathBuf::from("vigil.db") }
fn default_uploads_dir() -> PathBuf { PathBuf::from("uploads") }
fn default_max_upload_bytes() -> usize { vigil_api::DEFAULT_MAX_UPLOAD_BYTES }
fn default_geocoder_url() -> String { vigil_api::geocode::DEFAULT_NOMINATIM_URL.to_owned() }

impl ServerConfig {
  /// Load from an optional TOML file at `path`, then the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("VIGIL").try_parsing(true))
      .build()?
      .try_deserialize()
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use config::{Config, File, FileFormat};

  use super::*;

  fn parse(toml: &str) -> ServerConfig {
    Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_file_uses_defaults() {
    let cfg = parse("");
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.port, 5000);
    assert_eq!(cfg.database_path, PathBuf::from("vigil.db"));
    assert_eq!(cfg.uploads_dir, PathBuf::from("uploads"));
    assert_eq!(cfg.max_upload_bytes, 50 * 1024 * 1024);
    assert!(cfg.geocoder_url.contains("nominatim"));
  }

  #[test]
  fn file_values_override_defaults() {
    let cfg = parse(
      r#"
        port = 8080
        database_path = ":memory:"
        max_upload_bytes = 1024
      "#,
    );
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.database_path, PathBuf::from(":memory:"));
    assert_eq!(cfg.max_upload_bytes, 1024);
    assert_eq!(cfg.host, "0.0.0.0");
  }

  #[test]
  fn paths_without_tilde_are_unchanged() {
    let expanded = expand_tilde(Path::new("relative/uploads"));
    assert_eq!(expanded, PathBuf::from("relative/uploads"));
  }
}
