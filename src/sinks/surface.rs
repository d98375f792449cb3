use crate::core::{ChannelSink, Frame, FrameBatch};
use anyhow::{bail, Result};
use serde_json::Value;
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_MS: u64 = 27_000;

const MIN_DB: f64 = -100.0;
const MAX_DB: f64 = -30.0;

/// Map a raw 0..=255 intensity onto the dB scale the recording was taken with
pub fn intensity_to_db(value: f64) -> f64 {
    MIN_DB + (value / 255.0) * (MAX_DB - MIN_DB)
}

/// Columns needed to show `history_ms` of data at `sample_rate_hz`
pub fn columns_for_history(history_ms: u64, sample_rate_hz: f64) -> usize {
    (history_ms as f64 * sample_rate_hz / 1000.0).ceil() as usize
}

/// 3D scrolling surface grid with a fixed number of columns.
///
/// Intensities are the surface height; once the grid is full every new
/// column replaces the oldest one.
pub struct ScrollingSurface {
    column_count: usize,
    rows: usize,
    columns: VecDeque<(u64, Frame)>,
}

impl ScrollingSurface {
    pub fn new(column_count: usize, rows: usize) -> Result<Self> {
        if column_count == 0 {
            bail!("surface grid needs at least one column");
        }
        Ok(Self {
            column_count,
            rows,
            columns: VecDeque::with_capacity(column_count),
        })
    }

    pub fn for_history(history_ms: u64, sample_rate_hz: f64, rows: usize) -> Result<Self> {
        Self::new(columns_for_history(history_ms, sample_rate_hz), rows)
    }

    pub fn from_config(config: &Value, sample_rate_hz: f64, rows: usize, history_ms: u64) -> Result<Self> {
        let column_count = match config["columns"].as_u64() {
            Some(columns) => columns as usize,
            None => {
                let history_ms = config["history_ms"].as_u64().unwrap_or(history_ms);
                columns_for_history(history_ms, sample_rate_hz)
            }
        };
        Self::new(column_count, rows)
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Filled columns, oldest first
    pub fn columns(&self) -> impl Iterator<Item = (u64, &Frame)> {
        self.columns.iter().map(|(sequence, frame)| (*sequence, frame))
    }

    pub fn filled(&self) -> usize {
        self.columns.len()
    }

    pub fn is_full(&self) -> bool {
        self.columns.len() == self.column_count
    }

    /// Height of the surface at a grid position, in dB
    pub fn height_db(&self, column: usize, row: usize) -> Option<f64> {
        let (_, frame) = self.columns.get(column)?;
        frame.get(row).copied().map(intensity_to_db)
    }
}

impl ChannelSink for ScrollingSurface {
    fn kind(&self) -> &str {
        "surface"
    }

    fn accept(&mut self, batch: FrameBatch) -> Result<()> {
        if let Some((sequence, frame)) = batch.sequenced().find(|(_, f)| f.len() != self.rows) {
            bail!(
                "frame {} has {} y values, surface has {} rows",
                sequence,
                frame.len(),
                self.rows
            );
        }

        let start = batch.start_sequence;
        for (offset, frame) in batch.frames.into_iter().enumerate() {
            if self.columns.len() == self.column_count {
                self.columns.pop_front();
            }
            self.columns.push_back((start + offset as u64, frame));
        }

        Ok(())
    }
}
