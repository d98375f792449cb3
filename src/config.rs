use crate::resilience::SinkErrorPolicy;
use crate::sinks::surface::DEFAULT_HISTORY_MS;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;

pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 35.0;
pub const DEFAULT_MAX_PER_TICK: usize = 100;
pub const DEFAULT_REFRESH_HZ: f64 = 60.0;

/// One sink entry: `{"type": "heatmap", "config": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkConfig {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub config: Value,
}

impl SinkConfig {
    pub fn new(kind: impl Into<String>, config: Value) -> Self {
        Self {
            kind: kind.into(),
            config,
        }
    }
}

/// A replayed channel: display name, dataset key and where its frames go
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub name: String,
    pub source: String,

    #[serde(default = "default_sinks")]
    pub sinks: Vec<SinkConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Frames per second replayed from the dataset
    #[serde(default = "default_sample_rate_hz")]
    pub sample_rate_hz: f64,

    /// Ceiling on frames emitted per channel in one tick
    #[serde(default = "default_max_per_tick")]
    pub max_per_tick: usize,

    /// Rate of the display refresh ticker
    #[serde(default = "default_refresh_hz")]
    pub refresh_hz: f64,

    /// Visible history of the scrolling views
    #[serde(default = "default_history_ms")]
    pub history_ms: u64,

    #[serde(default)]
    pub sink_error_policy: SinkErrorPolicy,

    #[serde(default = "default_channels")]
    pub channels: Vec<ChannelConfig>,
}

fn default_sample_rate_hz() -> f64 {
    DEFAULT_SAMPLE_RATE_HZ
}

fn default_max_per_tick() -> usize {
    DEFAULT_MAX_PER_TICK
}

fn default_refresh_hz() -> f64 {
    DEFAULT_REFRESH_HZ
}

fn default_history_ms() -> u64 {
    DEFAULT_HISTORY_MS
}

fn default_sinks() -> Vec<SinkConfig> {
    vec![
        SinkConfig::new("heatmap", json!({})),
        SinkConfig::new("surface", json!({})),
    ]
}

fn default_channels() -> Vec<ChannelConfig> {
    [("Channel 1", "ch1"), ("Channel 2", "ch2")]
        .into_iter()
        .map(|(name, source)| ChannelConfig {
            name: name.to_string(),
            source: source.to_string(),
            sinks: default_sinks(),
        })
        .collect()
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            max_per_tick: DEFAULT_MAX_PER_TICK,
            refresh_hz: DEFAULT_REFRESH_HZ,
            history_ms: DEFAULT_HISTORY_MS,
            sink_error_policy: SinkErrorPolicy::default(),
            channels: default_channels(),
        }
    }
}

impl ReplayConfig {
    pub fn from_json(config: Value) -> Result<Self> {
        let config: Self = serde_json::from_value(config).context("invalid replay config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let value: Value = serde_json::from_str(&text)
            .with_context(|| format!("config {} is not valid JSON", path.display()))?;
        Self::from_json(value)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            bail!("sample_rate_hz must be positive, got {}", self.sample_rate_hz);
        }
        if self.max_per_tick == 0 {
            bail!("max_per_tick must be positive");
        }
        if !(self.refresh_hz.is_finite() && self.refresh_hz > 0.0) {
            bail!("refresh_hz must be positive, got {}", self.refresh_hz);
        }
        if self.channels.is_empty() {
            bail!("at least one channel must be configured");
        }
        for (i, channel) in self.channels.iter().enumerate() {
            if self.channels[..i].iter().any(|c| c.name == channel.name) {
                bail!("duplicate channel name '{}'", channel.name);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_demo() {
        let config = ReplayConfig::from_json(json!({})).unwrap();
        assert_eq!(config.sample_rate_hz, 35.0);
        assert_eq!(config.max_per_tick, 100);
        assert_eq!(config.history_ms, 27_000);
        assert_eq!(config.channels.len(), 2);
        assert_eq!(config.channels[1].source, "ch2");
        assert_eq!(config.channels[0].sinks.len(), 2);
        assert_eq!(config, ReplayConfig::default());
    }

    #[test]
    fn test_rejects_invalid_rates() {
        assert!(ReplayConfig::from_json(json!({"sample_rate_hz": 0.0})).is_err());
        assert!(ReplayConfig::from_json(json!({"max_per_tick": 0})).is_err());
        assert!(ReplayConfig::from_json(json!({"refresh_hz": -1.0})).is_err());
    }

    #[test]
    fn test_rejects_duplicate_channels() {
        let config = json!({
            "channels": [
                {"name": "Left", "source": "ch1"},
                {"name": "Left", "source": "ch2"}
            ]
        });
        assert!(ReplayConfig::from_json(config).is_err());
    }

    #[test]
    fn test_policy_parses_snake_case() {
        let config = ReplayConfig::from_json(json!({"sink_error_policy": "halt"})).unwrap();
        assert_eq!(config.sink_error_policy, SinkErrorPolicy::Halt);
    }
}
