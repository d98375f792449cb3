pub mod fanout;
pub mod forward;
pub mod heatmap;
pub mod log_sink;
pub mod shared_memory;
pub mod surface;

pub use fanout::FanoutSink;
pub use forward::ForwardSink;
pub use heatmap::ScrollingHeatmap;
pub use log_sink::LogSink;
pub use shared_memory::SharedSpectrogramSink;
pub use surface::ScrollingSurface;

use crate::config::SinkConfig;
use crate::core::ChannelSink;
use anyhow::{anyhow, bail, Context, Result};

/// What a sink needs to know about the channel it is attached to
#[derive(Debug, Clone, Copy)]
pub struct SinkContext<'a> {
    pub channel: &'a str,
    pub sample_rate_hz: f64,
    pub bins: usize,
    pub history_ms: u64,
}

/// Build one sink from its `{"type": .., "config": ..}` entry
pub fn build_sink(config: &SinkConfig, ctx: &SinkContext) -> Result<Box<dyn ChannelSink>> {
    let params = &config.config;
    let sink: Box<dyn ChannelSink> = match config.kind.as_str() {
        "heatmap" => Box::new(ScrollingHeatmap::from_config(params, ctx.bins)?),
        "surface" => Box::new(ScrollingSurface::from_config(
            params,
            ctx.sample_rate_hz,
            ctx.bins,
            ctx.history_ms,
        )?),
        "log" => Box::new(LogSink::from_config(params, ctx.channel)?),
        "shared_memory" => Box::new(SharedSpectrogramSink::from_config(
            params,
            ctx.sample_rate_hz,
            ctx.bins,
            ctx.history_ms,
        )?),
        other => return Err(anyhow!("Unknown sink type: {}", other)),
    };
    Ok(sink)
}

/// Build the sink for a channel; several entries are fanned out
pub fn build_channel_sink(configs: &[SinkConfig], ctx: &SinkContext) -> Result<Box<dyn ChannelSink>> {
    let mut sinks = configs
        .iter()
        .map(|config| {
            build_sink(config, ctx)
                .with_context(|| format!("channel '{}': bad {} sink", ctx.channel, config.kind))
        })
        .collect::<Result<Vec<_>>>()?;

    match sinks.len() {
        0 => bail!("channel '{}' has no sinks", ctx.channel),
        1 => Ok(sinks.remove(0)),
        _ => Ok(Box::new(FanoutSink::new(sinks))),
    }
}
