use crate::core::Frame;
use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// Recorded frames for one channel of the dataset
#[derive(Debug, Clone)]
pub struct ChannelFrames {
    frames: Arc<[Frame]>,
    bins: usize,
}

impl ChannelFrames {
    /// Validate and wrap a frame sequence. Every frame must have the same,
    /// non-zero number of finite samples.
    pub fn new(frames: Vec<Frame>) -> Result<Self> {
        let first = frames.first().ok_or(anyhow!("channel has no frames"))?;
        let bins = first.len();
        if bins == 0 {
            bail!("frame 0 is empty");
        }

        for (index, frame) in frames.iter().enumerate() {
            if frame.len() != bins {
                bail!(
                    "frame {} has {} samples, expected {}",
                    index,
                    frame.len(),
                    bins
                );
            }
            if let Some(bin) = frame.iter().position(|v| !v.is_finite()) {
                bail!("frame {} has a non-finite sample at bin {}", index, bin);
            }
        }

        Ok(Self {
            frames: frames.into(),
            bins,
        })
    }

    pub fn frames(&self) -> Arc<[Frame]> {
        self.frames.clone()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Samples per frame
    pub fn bins(&self) -> usize {
        self.bins
    }
}

/// Immutable set of recorded channels, keyed by their name in the source file
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    channels: BTreeMap<String, ChannelFrames>,
}

impl Dataset {
    /// Parse `{"ch1": [[..], ..], "ch2": [[..], ..]}`
    pub fn from_json(value: Value) -> Result<Self> {
        let object = match value {
            Value::Object(object) => object,
            _ => bail!("dataset must be a JSON object of channels"),
        };

        let mut channels = BTreeMap::new();
        for (key, frames) in object {
            let frames: Vec<Frame> = serde_json::from_value(frames)
                .with_context(|| format!("channel '{}' is not an array of frames", key))?;
            let channel = ChannelFrames::new(frames)
                .with_context(|| format!("invalid channel '{}'", key))?;
            channels.insert(key, channel);
        }

        if channels.is_empty() {
            bail!("dataset contains no channels");
        }

        Ok(Self { channels })
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let value: Value = serde_json::from_reader(reader).context("dataset is not valid JSON")?;
        Self::from_json(value)
    }

    /// Read and validate a dataset file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read dataset {}", path.display()))?;
        let dataset = Self::from_reader(bytes.as_slice())
            .with_context(|| format!("failed to load dataset {}", path.display()))?;

        log::info!(
            "Loaded dataset {} ({} channels)",
            path.display(),
            dataset.channels.len()
        );
        Ok(dataset)
    }

    pub fn channel(&self, key: &str) -> Option<&ChannelFrames> {
        self.channels.get(key)
    }

    pub fn channel_keys(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_ragged_frames() {
        let err = Dataset::from_json(json!({"ch1": [[1, 2, 3], [4, 5]]})).unwrap_err();
        assert!(format!("{:#}", err).contains("frame 1 has 2 samples"));
    }

    #[test]
    fn test_rejects_empty_channel() {
        let err = Dataset::from_json(json!({"ch1": [[1.0]], "ch2": []})).unwrap_err();
        assert!(format!("{:#}", err).contains("ch2"));
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(Dataset::from_json(json!([[1, 2]])).is_err());
        assert!(Dataset::from_json(json!({})).is_err());
    }

    #[test]
    fn test_rejects_non_array_channel() {
        let err = Dataset::from_json(json!({"ch1": "not frames"})).unwrap_err();
        assert!(format!("{:#}", err).contains("channel 'ch1' is not an array of frames"));
    }
}
