use super::MetricsCollector;

pub struct ReplayMonitor {
    collector: MetricsCollector,
}

impl ReplayMonitor {
    pub fn new(collector: MetricsCollector) -> Self {
        Self { collector }
    }

    pub fn generate_report(&self) -> String {
        let snapshot = self.collector.snapshot();

        if snapshot.is_empty() {
            return "No channels registered".to_string();
        }

        let mut report = String::from("=== Replay Metrics ===\n");

        for (channel, metrics) in snapshot.iter() {
            report.push_str(&format!(
                "\n[{}]\n  Frames: {} frames in {} batches\n  Errors: {}\n  Avg Sink Latency: {}μs\n",
                channel,
                metrics.frames_emitted,
                metrics.batches_emitted,
                match metrics.sink_errors {
                    0 => "0 errors".to_string(),
                    1 => "1 error".to_string(),
                    n => format!("{} errors", n),
                },
                metrics.avg_latency_us
            ));
        }

        report
    }

    pub fn collector(&self) -> &MetricsCollector {
        &self.collector
    }
}
