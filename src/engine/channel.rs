use super::cursor::ReplayCursor;
use crate::core::{ChannelSink, Frame, FrameBatch};
use crate::dataset::ChannelFrames;
use crate::resilience::GuardedSink;
use anyhow::{bail, Result};
use std::sync::Arc;

/// Static description of a replayed channel: name, recorded frames and the
/// sink they are pushed into.
pub struct ChannelDescriptor {
    pub name: String,
    pub frames: Arc<[Frame]>,
    pub sink: Box<dyn ChannelSink>,
}

impl ChannelDescriptor {
    pub fn new(name: impl Into<String>, frames: Arc<[Frame]>, sink: Box<dyn ChannelSink>) -> Result<Self> {
        let name = name.into();
        if frames.is_empty() {
            bail!("channel '{}' has no frames to replay", name);
        }
        Ok(Self { name, frames, sink })
    }

    pub fn from_recorded(
        name: impl Into<String>,
        recorded: &ChannelFrames,
        sink: Box<dyn ChannelSink>,
    ) -> Result<Self> {
        Self::new(name, recorded.frames(), sink)
    }
}

/// Channel as owned by a running scheduler
pub struct ReplayChannel {
    name: String,
    frames: Arc<[Frame]>,
    cursor: ReplayCursor,
    sink: GuardedSink,
}

impl ReplayChannel {
    pub(crate) fn new(name: String, frames: Arc<[Frame]>, sink: GuardedSink) -> Self {
        Self {
            name,
            frames,
            cursor: ReplayCursor::new(),
            sink,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn emitted(&self) -> u64 {
        self.cursor.emitted()
    }

    pub fn sink(&self) -> &GuardedSink {
        &self.sink
    }

    /// Next `count` frames in cyclic replay order
    pub fn next_batch(&self, count: usize, sample_rate_hz: f64) -> FrameBatch {
        let mut batch = FrameBatch::new(self.name.clone(), self.cursor.emitted(), sample_rate_hz);
        batch.frames.reserve(count);
        for index in self.cursor.source_indices(count, self.frames.len()) {
            batch.frames.push(self.frames[index].clone());
        }
        batch
    }

    /// Hand the next `count` frames to the sink and move the cursor past them.
    ///
    /// The cursor advances even if the sink rejects the batch.
    pub(crate) fn emit(&mut self, count: usize, sample_rate_hz: f64) -> Result<()> {
        let batch = self.next_batch(count, sample_rate_hz);
        let result = self.sink.accept(batch);
        self.cursor.advance(count);
        result
    }

    pub(crate) fn into_parts(self) -> (String, Box<dyn ChannelSink>) {
        (self.name, self.sink.into_inner())
    }
}
