use super::ChannelMetrics;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub channel: String,
    pub batches_emitted: u64,
    pub frames_emitted: u64,
    pub sink_errors: u64,
    pub avg_latency_us: u64,
}

#[derive(Clone, Default)]
pub struct MetricsCollector {
    metrics: BTreeMap<String, Arc<ChannelMetrics>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, channel: impl Into<String>, metrics: Arc<ChannelMetrics>) {
        self.metrics.insert(channel.into(), metrics);
    }

    pub fn snapshot(&self) -> BTreeMap<String, MetricsSnapshot> {
        self.metrics
            .iter()
            .map(|(name, metrics)| {
                (
                    name.clone(),
                    MetricsSnapshot {
                        channel: metrics.channel().to_string(),
                        batches_emitted: metrics.batches_emitted(),
                        frames_emitted: metrics.frames_emitted(),
                        sink_errors: metrics.sink_errors(),
                        avg_latency_us: metrics.avg_latency_us(),
                    },
                )
            })
            .collect()
    }

    pub fn get_channel_metrics(&self, channel: &str) -> Option<Arc<ChannelMetrics>> {
        self.metrics.get(channel).cloned()
    }
}
