use anyhow::{bail, Result};
use tokio::time::Duration;

/// Target emission schedule: how many frames should exist after `elapsed`
/// at a fixed nominal rate, and how many of those may go out in one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionSchedule {
    sample_rate_hz: f64,
    max_per_tick: usize,
}

impl EmissionSchedule {
    pub fn new(sample_rate_hz: f64, max_per_tick: usize) -> Result<Self> {
        if !(sample_rate_hz.is_finite() && sample_rate_hz > 0.0) {
            bail!("sample rate must be positive, got {}", sample_rate_hz);
        }
        if max_per_tick == 0 {
            bail!("max frames per tick must be positive");
        }
        Ok(Self {
            sample_rate_hz,
            max_per_tick,
        })
    }

    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }

    pub fn max_per_tick(&self) -> usize {
        self.max_per_tick
    }

    /// `floor(sample_rate * elapsed_ms / 1000)`
    pub fn due(&self, elapsed: Duration) -> u64 {
        let elapsed_ms = elapsed.as_nanos() as f64 / 1_000_000.0;
        (self.sample_rate_hz * elapsed_ms / 1000.0).floor() as u64
    }

    /// Frames to emit this tick given how many already went out
    pub fn to_emit(&self, due: u64, emitted: u64) -> usize {
        let behind = due.saturating_sub(emitted);
        behind.min(self.max_per_tick as u64) as usize
    }
}
