use super::TickSource;
use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio::time::{interval, Duration, Interval, MissedTickBehavior};

/// Fixed-rate ticker standing in for the display refresh
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(refresh_hz: f64) -> Result<Self> {
        if !(refresh_hz.is_finite() && refresh_hz > 0.0) {
            bail!("refresh rate must be positive, got {}", refresh_hz);
        }

        let mut interval = interval(Duration::from_secs_f64(1.0 / refresh_hz));
        // A suspended host wakes to one late tick rather than a burst of them
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Ok(Self { interval })
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }
}

#[async_trait]
impl TickSource for IntervalTicker {
    async fn next_tick(&mut self) -> Result<()> {
        self.interval.tick().await;
        Ok(())
    }
}
