use super::surface::intensity_to_db;
use crate::core::{ChannelSink, FrameBatch};
use anyhow::{anyhow, Result};
use log::Level;
use serde_json::Value;
use std::str::FromStr;

/// Writes a one-line summary of every batch to the log
pub struct LogSink {
    label: String,
    level: Level,
}

impl LogSink {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            level: Level::Debug,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn from_config(config: &Value, channel: &str) -> Result<Self> {
        let mut sink = Self::new(config["label"].as_str().unwrap_or(channel));
        if let Some(level) = config["level"].as_str() {
            let level = Level::from_str(level).map_err(|_| anyhow!("Unknown log level: {}", level))?;
            sink = sink.with_level(level);
        }
        Ok(sink)
    }
}

impl ChannelSink for LogSink {
    fn kind(&self) -> &str {
        "log"
    }

    fn accept(&mut self, batch: FrameBatch) -> Result<()> {
        let peak = batch
            .frames
            .iter()
            .filter_map(|frame| frame.peak())
            .reduce(f64::max);

        let peak = match peak {
            Some(p) => format!("{:.0} dB", intensity_to_db(p)),
            None => "empty".to_string(),
        };

        log::log!(
            self.level,
            "[{}] frames #{}..#{} @ {:.0}ms ({} frames, peak {})",
            self.label,
            batch.start_sequence,
            batch.start_sequence + batch.len() as u64,
            batch.timestamp_ms(0),
            batch.len(),
            peak
        );
        Ok(())
    }
}
