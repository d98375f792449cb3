use crate::core::{ChannelSink, FrameBatch};
use anyhow::{anyhow, Result};

/// Delivers every batch to several sinks, e.g. a heatmap and a surface view
/// of the same channel.
pub struct FanoutSink {
    outputs: Vec<Box<dyn ChannelSink>>,
}

impl FanoutSink {
    pub fn new(outputs: Vec<Box<dyn ChannelSink>>) -> Self {
        Self { outputs }
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

impl ChannelSink for FanoutSink {
    fn kind(&self) -> &str {
        "fanout"
    }

    /// Every output sees the batch even when an earlier one fails
    fn accept(&mut self, batch: FrameBatch) -> Result<()> {
        let mut failures = Vec::new();

        if let Some((last, rest)) = self.outputs.split_last_mut() {
            for output in rest {
                if let Err(e) = output.accept(batch.clone()) {
                    failures.push(format!("{}: {:#}", output.kind(), e));
                }
            }
            if let Err(e) = last.accept(batch) {
                failures.push(format!("{}: {:#}", last.kind(), e));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("{} of {} outputs failed ({})", failures.len(), self.outputs.len(), failures.join("; ")))
        }
    }
}
