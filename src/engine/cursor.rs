/// Count of frames already emitted for one channel. Only ever moves forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayCursor {
    emitted: u64,
}

impl ReplayCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Source indices for the next `count` frames, wrapping around `frame_count`
    pub fn source_indices(&self, count: usize, frame_count: usize) -> impl Iterator<Item = usize> {
        let start = self.emitted;
        let frame_count = frame_count as u64;
        (0..count as u64).map(move |k| ((start + k) % frame_count) as usize)
    }

    pub fn advance(&mut self, count: usize) {
        self.emitted += count as u64;
    }
}
