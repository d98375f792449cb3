use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Counters for one replayed channel. Updated from the tick loop, readable from anywhere.
pub struct ChannelMetrics {
    channel: String,
    batches_emitted: AtomicU64,
    frames_emitted: AtomicU64,
    sink_errors: AtomicU64,
    total_latency_us: AtomicU64,
    latency_samples: AtomicU64,
}

impl ChannelMetrics {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            batches_emitted: AtomicU64::new(0),
            frames_emitted: AtomicU64::new(0),
            sink_errors: AtomicU64::new(0),
            total_latency_us: AtomicU64::new(0),
            latency_samples: AtomicU64::new(0),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn batches_emitted(&self) -> u64 {
        self.batches_emitted.load(Ordering::Relaxed)
    }

    pub fn frames_emitted(&self) -> u64 {
        self.frames_emitted.load(Ordering::Relaxed)
    }

    pub fn sink_errors(&self) -> u64 {
        self.sink_errors.load(Ordering::Relaxed)
    }

    pub fn record_batch(&self, frames: usize) {
        self.batches_emitted.fetch_add(1, Ordering::Relaxed);
        self.frames_emitted.fetch_add(frames as u64, Ordering::Relaxed);
    }

    pub fn record_sink_error(&self) {
        self.sink_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn start_delivery(&self) -> Instant {
        Instant::now()
    }

    pub fn finish_delivery(&self, start: Instant) {
        let latency_us = start.elapsed().as_micros() as u64;
        self.total_latency_us.fetch_add(latency_us, Ordering::Relaxed);
        self.latency_samples.fetch_add(1, Ordering::Relaxed);
    }

    /// Mean time spent inside the sink per batch
    pub fn avg_latency_us(&self) -> u64 {
        let samples = self.latency_samples.load(Ordering::Relaxed);
        if samples == 0 {
            return 0;
        }
        self.total_latency_us.load(Ordering::Relaxed) / samples
    }
}
