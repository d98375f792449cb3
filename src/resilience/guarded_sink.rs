use super::SinkErrorPolicy;
use crate::core::{ChannelSink, FrameBatch};
use crate::observability::ChannelMetrics;
use anyhow::Result;
use std::sync::Arc;

/// Sink wrapper that records delivery metrics and applies the error policy
pub struct GuardedSink {
    inner: Box<dyn ChannelSink>,
    metrics: Arc<ChannelMetrics>,
    policy: SinkErrorPolicy,
}

impl GuardedSink {
    pub fn new(
        inner: Box<dyn ChannelSink>,
        metrics: Arc<ChannelMetrics>,
        policy: SinkErrorPolicy,
    ) -> Self {
        Self {
            inner,
            metrics,
            policy,
        }
    }

    pub fn metrics(&self) -> &Arc<ChannelMetrics> {
        &self.metrics
    }

    pub fn policy(&self) -> SinkErrorPolicy {
        self.policy
    }

    /// Release the wrapped sink
    pub fn into_inner(self) -> Box<dyn ChannelSink> {
        self.inner
    }
}

impl ChannelSink for GuardedSink {
    fn kind(&self) -> &str {
        self.inner.kind()
    }

    fn accept(&mut self, batch: FrameBatch) -> Result<()> {
        let frames = batch.len();
        let start = self.metrics.start_delivery();
        let result = self.inner.accept(batch);
        self.metrics.finish_delivery(start);
        self.metrics.record_batch(frames);

        match result {
            Ok(()) => Ok(()),
            Err(e) => {
                self.metrics.record_sink_error();

                match self.policy {
                    SinkErrorPolicy::LogAndContinue => {
                        log::warn!(
                            "[{}] {} sink dropped {} frames: {:#}",
                            self.metrics.channel(),
                            self.inner.kind(),
                            frames,
                            e
                        );
                        Ok(())
                    }
                    SinkErrorPolicy::Halt => Err(e.context(format!(
                        "{} sink for channel '{}' failed",
                        self.inner.kind(),
                        self.metrics.channel()
                    ))),
                }
            }
        }
    }
}
