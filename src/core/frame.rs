use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::sync::Arc;

/// One time step of intensity samples across the frequency axis.
///
/// Frames are shared between the dataset, the scheduler and every sink, so
/// cloning only bumps a reference count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<f64>", into = "Vec<f64>")]
pub struct Frame(Arc<[f64]>);

impl Frame {
    pub fn new(samples: Vec<f64>) -> Self {
        Self(samples.into())
    }

    pub fn samples(&self) -> &[f64] {
        &self.0
    }

    /// Largest sample in the frame, `None` for an empty frame
    pub fn peak(&self) -> Option<f64> {
        self.0.iter().copied().reduce(f64::max)
    }
}

impl Deref for Frame {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<f64>> for Frame {
    fn from(samples: Vec<f64>) -> Self {
        Self::new(samples)
    }
}

impl From<Frame> for Vec<f64> {
    fn from(frame: Frame) -> Self {
        frame.0.to_vec()
    }
}

/// Batch of consecutive frames handed to a sink in a single call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameBatch {
    /// Channel the frames were replayed from
    pub channel: String,

    /// Emission sequence number of the first frame (not the source index)
    pub start_sequence: u64,

    /// Nominal replay rate the frames were scheduled at
    pub sample_rate_hz: f64,

    pub frames: Vec<Frame>,
}

impl FrameBatch {
    pub fn new(channel: impl Into<String>, start_sequence: u64, sample_rate_hz: f64) -> Self {
        Self {
            channel: channel.into(),
            start_sequence,
            sample_rate_hz,
            frames: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Nominal time of the frame at `offset` within this batch, in ms since replay start
    pub fn timestamp_ms(&self, offset: usize) -> f64 {
        (self.start_sequence + offset as u64) as f64 * 1000.0 / self.sample_rate_hz
    }

    /// Iterate `(sequence, frame)` pairs
    pub fn sequenced(&self) -> impl Iterator<Item = (u64, &Frame)> {
        self.frames
            .iter()
            .enumerate()
            .map(move |(i, frame)| (self.start_sequence + i as u64, frame))
    }
}
