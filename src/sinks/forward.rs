use crate::core::{ChannelSink, FrameBatch};
use anyhow::{anyhow, Result};
use crossbeam_channel::{Receiver, Sender, TrySendError};

/// Hands batches to a consumer on another thread through a bounded channel.
///
/// A full or closed channel is reported as a sink error; the tick never waits.
pub struct ForwardSink {
    tx: Sender<FrameBatch>,
}

impl ForwardSink {
    pub fn new(tx: Sender<FrameBatch>) -> Self {
        Self { tx }
    }

    pub fn bounded(capacity: usize) -> (Self, Receiver<FrameBatch>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (Self::new(tx), rx)
    }
}

impl ChannelSink for ForwardSink {
    fn kind(&self) -> &str {
        "forward"
    }

    fn accept(&mut self, batch: FrameBatch) -> Result<()> {
        match self.tx.try_send(batch) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(batch)) => Err(anyhow!(
                "consumer is lagging, dropped batch starting at frame {}",
                batch.start_sequence
            )),
            Err(TrySendError::Disconnected(_)) => Err(anyhow!("consumer disconnected")),
        }
    }
}
