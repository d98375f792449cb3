use super::surface::columns_for_history;
use crate::core::{ChannelSink, FrameBatch};
use anyhow::{anyhow, bail, Context, Result};
use memmap2::MmapMut;
use serde_json::Value;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

pub const MAGIC: &[u8; 8] = b"SPECTRO!";
pub const VERSION: u64 = 1;
pub const HEADER_SIZE: usize = 4096;

const WRITE_SEQUENCE_OFFSET: usize = 40;

#[derive(Debug, Clone, PartialEq)]
pub struct SpectrogramHeader {
    pub version: u64,
    pub sample_rate_hz: f64,
    pub bins: usize,
    pub capacity: usize,
    /// Columns written so far; the newest sits in slot `(write_sequence - 1) % capacity`
    pub write_sequence: u64,
}

impl SpectrogramHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            bail!("file too short for a spectrogram header");
        }
        if &bytes[0..8] != MAGIC {
            bail!("bad magic");
        }
        let word = |offset: usize| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&bytes[offset..offset + 8]);
            u64::from_le_bytes(raw)
        };

        Ok(Self {
            version: word(8),
            sample_rate_hz: f64::from_bits(word(16)),
            bins: word(24) as usize,
            capacity: word(32) as usize,
            write_sequence: word(WRITE_SEQUENCE_OFFSET),
        })
    }

    /// Byte offset of a column slot in the file
    pub fn slot_offset(&self, sequence: u64) -> usize {
        HEADER_SIZE + (sequence % self.capacity as u64) as usize * self.bins * 8
    }
}

/// Publishes the scrolling spectrogram history through a memory-mapped file
/// so an out-of-process renderer can draw it.
///
/// Layout: a 4 KiB header, then `capacity` column slots of `bins` little
/// endian f64 values, written cyclically by emission sequence.
pub struct SharedSpectrogramSink {
    path: PathBuf,
    mmap: MmapMut,
    bins: usize,
    capacity: usize,
}

impl SharedSpectrogramSink {
    pub fn create(
        path: impl AsRef<Path>,
        sample_rate_hz: f64,
        bins: usize,
        capacity: usize,
    ) -> Result<Self> {
        if bins == 0 || capacity == 0 {
            bail!("shared spectrogram needs at least one bin and one column");
        }

        let path = path.as_ref().to_path_buf();
        let data_size = bins * capacity * 8;
        let total_size = HEADER_SIZE + data_size;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        file.set_len(total_size as u64)?;

        // SAFETY: the file is sized above and only this sink writes to it
        let mut mmap = unsafe { MmapMut::map_mut(&file)? };

        mmap[0..8].copy_from_slice(MAGIC);
        mmap[8..16].copy_from_slice(&VERSION.to_le_bytes());
        mmap[16..24].copy_from_slice(&sample_rate_hz.to_bits().to_le_bytes());
        mmap[24..32].copy_from_slice(&(bins as u64).to_le_bytes());
        mmap[32..40].copy_from_slice(&(capacity as u64).to_le_bytes());
        mmap[WRITE_SEQUENCE_OFFSET..WRITE_SEQUENCE_OFFSET + 8].copy_from_slice(&0u64.to_le_bytes());

        Ok(Self {
            path,
            mmap,
            bins,
            capacity,
        })
    }

    pub fn from_config(config: &Value, sample_rate_hz: f64, bins: usize, history_ms: u64) -> Result<Self> {
        let path = config["path"]
            .as_str()
            .ok_or(anyhow!("shared_memory sink requires a path"))?;
        let capacity = config["columns"]
            .as_u64()
            .map(|c| c as usize)
            .unwrap_or_else(|| columns_for_history(history_ms, sample_rate_hz));
        Self::create(path, sample_rate_hz, bins, capacity)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn publish(&mut self, written: u64) -> Result<()> {
        self.mmap[WRITE_SEQUENCE_OFFSET..WRITE_SEQUENCE_OFFSET + 8]
            .copy_from_slice(&written.to_le_bytes());
        self.mmap.flush_range(WRITE_SEQUENCE_OFFSET, 8)?;
        Ok(())
    }
}

impl ChannelSink for SharedSpectrogramSink {
    fn kind(&self) -> &str {
        "shared_memory"
    }

    fn accept(&mut self, batch: FrameBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        if let Some((sequence, frame)) = batch.sequenced().find(|(_, f)| f.len() != self.bins) {
            bail!(
                "frame {} has {} bins, shared spectrogram has {}",
                sequence,
                frame.len(),
                self.bins
            );
        }

        for (sequence, frame) in batch.sequenced() {
            let slot = (sequence % self.capacity as u64) as usize;
            let offset = HEADER_SIZE + slot * self.bins * 8;
            for (bin, value) in frame.iter().enumerate() {
                let at = offset + bin * 8;
                self.mmap[at..at + 8].copy_from_slice(&value.to_le_bytes());
            }
        }

        // Publish only after the column data is in place
        self.publish(batch.start_sequence + batch.len() as u64)
    }
}
