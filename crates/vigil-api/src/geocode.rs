//! `GET /reverse-geocode?lat=&lon=` and the Nominatim-backed [`Geocoder`].

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use vigil_core::geocode::{Coordinates, Geocoder};

use crate::error::{ApiError, Result};

/// Public Nominatim reverse endpoint.
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/reverse";

// ─── Client ──────────────────────────────────────────────────────────────────

/// Reverse geocoder speaking the Nominatim JSON protocol.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
  client:   reqwest::Client,
  endpoint: String,
}

#[derive(Deserialize)]
struct NominatimReply {
  display_name: Option<String>,
}

impl NominatimGeocoder {
  pub fn new(endpoint: impl Into<String>) -> Self {
    Self { client: reqwest::Client::new(), endpoint: endpoint.into() }
  }
}

impl Geocoder for NominatimGeocoder {
  type Error = reqwest::Error;

  async fn reverse(&self, at: Coordinates) -> Result<Option<String>, reqwest::Error> {
    let reply: NominatimReply = self
      .client
      .get(&self.endpoint)
      .query(&[
        ("format", "json".to_owned()),
        ("lat", at.latitude.to_string()),
        ("lon", at.longitude.to_string()),
      ])
      // Nominatim's usage policy requires an identifying agent.
      .header(reqwest::header::USER_AGENT, concat!("vigil/", env!("CARGO_PKG_VERSION")))
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;
    Ok(reply.display_name.filter(|name| !name.trim().is_empty()))
  }
}

// ─── Handler ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReverseParams {
  pub lat: Option<String>,
  pub lon: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Address {
  pub address: String,
}

/// `GET /reverse-geocode?lat=<lat>&lon=<lon>`
pub async fn reverse<G: Geocoder>(
  State(geocoder): State<Arc<G>>,
  Query(params): Query<ReverseParams>,
) -> Result<Json<Address>> {
  let at = parse_coordinates(params)?;

  let address = geocoder
    .reverse(at)
    .await
    .map_err(|e| ApiError::Upstream(e.to_string()))?
    .ok_or_else(|| {
      vigil_core::Error::NotFound(format!("no address for {}", at.to_location_string()))
    })?;

  Ok(Json(Address { address }))
}

fn parse_coordinates(params: ReverseParams) -> Result<Coordinates> {
  let (Some(lat), Some(lon)) = (params.lat, params.lon) else {
    return Err(ApiError::BadRequest("latitude and longitude are required".into()));
  };
  let parsed = lat.trim().parse::<f64>().ok().zip(lon.trim().parse::<f64>().ok());
  parsed
    .and_then(|(lat, lon)| Coordinates::new(lat, lon))
    .ok_or_else(|| ApiError::BadRequest(format!("invalid coordinates: {lat}, {lon}")))
}
