use super::FrameBatch;
use anyhow::Result;
use std::sync::{Arc, Mutex};

/// Consumer of replayed frames for one channel.
///
/// The scheduler calls `accept` at most once per channel per tick, with the
/// frames in replay order. Whatever happens downstream (scrolling history,
/// memory limits, drawing) belongs to the sink.
pub trait ChannelSink: Send {
    /// Short identifier used in logs and reports
    fn kind(&self) -> &str;

    /// Take ownership of one batch. Must not block the tick.
    fn accept(&mut self, batch: FrameBatch) -> Result<()>;
}

/// Shared sinks let a reader (a render loop, a test) inspect the history
/// while the scheduler keeps feeding it.
impl<S: ChannelSink> ChannelSink for Arc<Mutex<S>> {
    fn kind(&self) -> &str {
        "shared"
    }

    fn accept(&mut self, batch: FrameBatch) -> Result<()> {
        self.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .accept(batch)
    }
}
