use crate::core::{ChannelSink, Frame, FrameBatch};
use anyhow::{bail, Result};
use serde_json::Value;
use std::collections::VecDeque;

pub const DEFAULT_MAX_DATA_POINTS: usize = 10_000;
pub const DEFAULT_ROW_STEP_HZ: f64 = 40.0;

/// One column of the scrolling grid
#[derive(Debug, Clone)]
pub struct HeatmapColumn {
    pub sequence: u64,
    pub x_ms: f64,
    pub values: Frame,
}

/// 2D scrolling heatmap: time along the columns, frequency bins along the rows.
///
/// Once more than `max_data_points` samples are retained the oldest columns
/// are cleaned away, so memory stays bounded however long the replay runs.
pub struct ScrollingHeatmap {
    resolution: Option<usize>,
    max_data_points: usize,
    row_step_hz: f64,
    columns: VecDeque<HeatmapColumn>,
    total_columns: u64,
}

impl Default for ScrollingHeatmap {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollingHeatmap {
    pub fn new() -> Self {
        Self {
            resolution: None,
            max_data_points: DEFAULT_MAX_DATA_POINTS,
            row_step_hz: DEFAULT_ROW_STEP_HZ,
            columns: VecDeque::new(),
            total_columns: 0,
        }
    }

    /// Fix the number of rows up front instead of taking it from the first batch
    pub fn with_resolution(mut self, rows: usize) -> Self {
        self.resolution = Some(rows);
        self
    }

    pub fn with_max_data_points(mut self, max_data_points: usize) -> Self {
        self.max_data_points = max_data_points;
        self
    }

    pub fn with_row_step_hz(mut self, row_step_hz: f64) -> Self {
        self.row_step_hz = row_step_hz;
        self
    }

    pub fn from_config(config: &Value, bins: usize) -> Result<Self> {
        let mut heatmap = Self::new().with_resolution(bins);
        if let Some(max) = config["max_data_points"].as_u64() {
            if max == 0 {
                bail!("max_data_points must be positive");
            }
            heatmap = heatmap.with_max_data_points(max as usize);
        }
        if let Some(step) = config["row_step_hz"].as_f64() {
            heatmap = heatmap.with_row_step_hz(step);
        }
        Ok(heatmap)
    }

    pub fn resolution(&self) -> Option<usize> {
        self.resolution
    }

    pub fn columns(&self) -> impl Iterator<Item = &HeatmapColumn> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns accepted since creation, including cleaned ones
    pub fn total_columns(&self) -> u64 {
        self.total_columns
    }

    pub fn latest(&self) -> Option<&HeatmapColumn> {
        self.columns.back()
    }

    /// Time span covered by the retained columns
    pub fn x_range_ms(&self) -> Option<(f64, f64)> {
        Some((self.columns.front()?.x_ms, self.columns.back()?.x_ms))
    }

    pub fn frequency_of_row(&self, row: usize) -> f64 {
        row as f64 * self.row_step_hz
    }

    fn clean(&mut self) {
        let rows = self.resolution.unwrap_or(0);
        while self.columns.len() > 1 && self.columns.len() * rows > self.max_data_points {
            self.columns.pop_front();
        }
    }
}

impl ChannelSink for ScrollingHeatmap {
    fn kind(&self) -> &str {
        "heatmap"
    }

    fn accept(&mut self, batch: FrameBatch) -> Result<()> {
        let rows = match (self.resolution, batch.frames.first()) {
            (Some(rows), _) => rows,
            (None, Some(first)) => first.len(),
            (None, None) => return Ok(()),
        };

        // Validate before touching the grid so a bad batch leaves no partial columns
        for (sequence, frame) in batch.sequenced() {
            if frame.len() != rows {
                bail!(
                    "frame {} has {} intensity values, heatmap resolution is {}",
                    sequence,
                    frame.len(),
                    rows
                );
            }
        }
        self.resolution = Some(rows);

        for (offset, frame) in batch.frames.iter().enumerate() {
            self.columns.push_back(HeatmapColumn {
                sequence: batch.start_sequence + offset as u64,
                x_ms: batch.timestamp_ms(offset),
                values: frame.clone(),
            });
        }
        self.total_columns += batch.len() as u64;
        self.clean();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(start: u64, count: usize, rows: usize) -> FrameBatch {
        let mut batch = FrameBatch::new("ch", start, 35.0);
        for i in 0..count {
            batch.frames.push(Frame::from(vec![(start + i as u64) as f64; rows]));
        }
        batch
    }

    #[test]
    fn test_data_cleaning_bounds_retained_points() {
        let mut heatmap = ScrollingHeatmap::new().with_max_data_points(100);

        heatmap.accept(batch(0, 30, 10)).unwrap();

        assert_eq!(heatmap.len(), 10);
        assert_eq!(heatmap.total_columns(), 30);
        assert_eq!(heatmap.columns().next().unwrap().sequence, 20);
        assert_eq!(heatmap.latest().unwrap().sequence, 29);
    }

    #[test]
    fn test_rejects_wrong_resolution_without_partial_write() {
        let mut heatmap = ScrollingHeatmap::new().with_resolution(4);
        let mut bad = batch(0, 2, 4);
        bad.frames.push(Frame::from(vec![0.0; 3]));

        assert!(heatmap.accept(bad).is_err());
        assert!(heatmap.is_empty());
    }

    #[test]
    fn test_x_range_follows_sample_interval() {
        let mut heatmap = ScrollingHeatmap::new();
        heatmap.accept(batch(35, 35, 2)).unwrap();

        let (start, end) = heatmap.x_range_ms().unwrap();
        assert_eq!(start, 1000.0);
        assert!((end - 34.0 * 1000.0 / 35.0 - 1000.0).abs() < 1e-9);
        assert_eq!(heatmap.frequency_of_row(3), 120.0);
    }
}
