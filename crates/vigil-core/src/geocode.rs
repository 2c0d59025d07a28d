//! Reverse geocoding, used to turn a captured position into an address.

use std::future::Future;

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  pub latitude:  f64,
  pub longitude: f64,
}

impl Coordinates {
  /// `None` unless both values are finite and inside the valid ranges.
  pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
    let valid = latitude.is_finite()
      && longitude.is_finite()
      && (-90.0..=90.0).contains(&latitude)
      && (-180.0..=180.0).contains(&longitude);
    valid.then_some(Self { latitude, longitude })
  }

  /// The `"<lat>, <lon>"` form stored as a report location when the reporter
  /// shares their position instead of typing an address.
  pub fn to_location_string(self) -> String {
    format!("{}, {}", self.latitude, self.longitude)
  }
}

/// A reverse geocoding backend.
pub trait Geocoder: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The display address for `at`, or `None` if the backend knows none.
  fn reverse(
    &self,
    at: Coordinates,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn coordinates_reject_out_of_range() {
    assert!(Coordinates::new(91.0, 0.0).is_none());
    assert!(Coordinates::new(0.0, -180.5).is_none());
    assert!(Coordinates::new(f64::NAN, 0.0).is_none());
    assert!(Coordinates::new(12.97, 77.59).is_some());
  }

  #[test]
  fn location_string_matches_browser_form() {
    let c = Coordinates::new(12.5, 77.25).unwrap();
    assert_eq!(c.to_location_string(), "12.5, 77.25");
  }
}
