//! Heart-rate sources polled by the monitor.

use std::future::Future;

use rand_core::{OsRng, RngCore as _};

/// Anything that can produce a heart-rate reading on demand.
pub trait HeartRateSource: Send + 'static {
  /// One reading in beats per minute, or `None` if the device had nothing.
  fn sample(&mut self) -> impl Future<Output = Option<u16>> + Send + '_;
}

/// Lowest and one-past-highest simulated value.
pub const SIMULATED_RANGE: (u16, u16) = (60, 160);

/// Uniform random readings in `60..160` BPM, standing in for a paired device.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedSource;

impl HeartRateSource for SimulatedSource {
  async fn sample(&mut self) -> Option<u16> {
    let (low, high) = SIMULATED_RANGE;
    let span = u32::from(high - low);
    Some(low + (OsRng.next_u32() % span) as u16)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn simulated_readings_stay_in_range() {
    let mut source = SimulatedSource;
    for _ in 0..500 {
      let bpm = source.sample().await.unwrap();
      assert!((60..160).contains(&bpm), "{bpm}");
    }
  }
}
