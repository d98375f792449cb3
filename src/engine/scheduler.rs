use super::channel::{ChannelDescriptor, ReplayChannel};
use super::schedule::EmissionSchedule;
use super::state::SchedulerState;
use crate::config::ReplayConfig;
use crate::core::ChannelSink;
use crate::dataset::Dataset;
use crate::observability::{ChannelMetrics, MetricsCollector, ReplayMonitor};
use crate::resilience::{GuardedSink, SinkErrorPolicy};
use crate::sinks::{build_channel_sink, SinkContext};
use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tokio::time::Instant;

/// Outcome of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Frames that should exist by now according to the schedule
    pub due: u64,
    /// Frames handed to each channel's sink during this tick
    pub emitted: usize,
    /// Frames emitted per channel since start
    pub total_emitted: u64,
    /// Frames still owed after this tick (non-zero only after a stall)
    pub backlog: u64,
}

/// Explicit replay state for one view: schedule, channels and their cursors.
///
/// A scheduler can only be built from frames that are already loaded, so it
/// can never start ahead of its dataset.
pub struct ReplayScheduler {
    schedule: EmissionSchedule,
    channels: Vec<ReplayChannel>,
    state: SchedulerState,
    metrics_collector: MetricsCollector,
}

impl ReplayScheduler {
    pub fn new(
        schedule: EmissionSchedule,
        descriptors: Vec<ChannelDescriptor>,
        policy: SinkErrorPolicy,
    ) -> Result<Self> {
        if descriptors.is_empty() {
            bail!("replay needs at least one channel");
        }

        let mut collector = MetricsCollector::new();
        let mut channels = Vec::with_capacity(descriptors.len());

        for descriptor in descriptors {
            if channels.iter().any(|c: &ReplayChannel| c.name() == descriptor.name) {
                bail!("duplicate channel name '{}'", descriptor.name);
            }

            let metrics = Arc::new(ChannelMetrics::new(&descriptor.name));
            collector.register(&descriptor.name, metrics.clone());

            let sink = GuardedSink::new(descriptor.sink, metrics, policy);
            channels.push(ReplayChannel::new(descriptor.name, descriptor.frames, sink));
        }

        Ok(Self {
            schedule,
            channels,
            state: SchedulerState::Idle,
            metrics_collector: collector,
        })
    }

    /// Wire every configured channel to its dataset frames and sinks
    pub fn from_config(config: &ReplayConfig, dataset: &Dataset) -> Result<Self> {
        config.validate()?;
        let schedule = EmissionSchedule::new(config.sample_rate_hz, config.max_per_tick)?;

        let mut descriptors = Vec::with_capacity(config.channels.len());
        for channel in &config.channels {
            let recorded = dataset.channel(&channel.source).ok_or_else(|| {
                anyhow!(
                    "dataset has no channel '{}' (needed by '{}')",
                    channel.source,
                    channel.name
                )
            })?;

            let ctx = SinkContext {
                channel: &channel.name,
                sample_rate_hz: config.sample_rate_hz,
                bins: recorded.bins(),
                history_ms: config.history_ms,
            };
            let sink = build_channel_sink(&channel.sinks, &ctx)?;
            descriptors.push(
                ChannelDescriptor::from_recorded(&channel.name, recorded, sink)
                    .with_context(|| format!("failed to set up channel '{}'", channel.name))?,
            );
        }

        Self::new(schedule, descriptors, config.sink_error_policy)
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn schedule(&self) -> &EmissionSchedule {
        &self.schedule
    }

    /// Transition to a new state with validation
    pub fn transition_to(&mut self, new_state: SchedulerState) -> Result<()> {
        if !self.state.can_transition_to(&new_state) {
            return Err(anyhow!(
                "Invalid state transition: {} -> {}",
                self.state.name(),
                new_state.name()
            ));
        }
        self.state = new_state;
        Ok(())
    }

    /// Capture the start time. Only valid once, from Idle.
    pub fn start(&mut self, now: Instant) -> Result<()> {
        self.transition_to(SchedulerState::Running {
            start_time: Some(now),
            ticks: 0,
        })?;

        log::info!(
            "Replay started: {} channel(s) at {} Hz, at most {} frames per tick",
            self.channels.len(),
            self.schedule.sample_rate_hz(),
            self.schedule.max_per_tick()
        );
        Ok(())
    }

    /// Emit whatever the schedule says is due at `now`, capped per tick
    pub fn tick(&mut self, now: Instant) -> Result<TickReport> {
        let start = match &mut self.state {
            SchedulerState::Running {
                start_time: Some(start),
                ticks,
            } => {
                *ticks += 1;
                *start
            }
            other => bail!("Cannot tick scheduler in state {}", other.name()),
        };

        let due = self.schedule.due(now.saturating_duration_since(start));
        let sample_rate_hz = self.schedule.sample_rate_hz();

        let mut emitted = 0;
        let mut first_error = None;
        for channel in &mut self.channels {
            let count = self.schedule.to_emit(due, channel.emitted());
            if count == 0 {
                continue;
            }
            if let Err(e) = channel.emit(count, sample_rate_hz) {
                first_error.get_or_insert(e);
            }
            emitted = emitted.max(count);
        }

        let total_emitted = self.emitted();
        let backlog = due.saturating_sub(total_emitted);
        if backlog > 0 {
            log::debug!(
                "Replay behind schedule by {} frames (due {}, emitted {})",
                backlog,
                due,
                total_emitted
            );
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(TickReport {
                due,
                emitted,
                total_emitted,
                backlog,
            }),
        }
    }

    /// Move to Stopped; the scheduler accepts no further ticks
    pub fn stop(&mut self, now: Instant) -> Result<()> {
        if let SchedulerState::Stopped { .. } = self.state {
            return Ok(());
        }

        let (duration, total_ticks) = match &self.state {
            SchedulerState::Running { start_time, ticks } => {
                (start_time.map(|t| now.saturating_duration_since(t)), *ticks)
            }
            _ => (None, 0),
        };
        self.transition_to(SchedulerState::Stopped {
            duration,
            total_ticks,
        })?;

        log::info!(
            "Replay stopped after {} ticks, {} frames per channel",
            total_ticks,
            self.emitted()
        );
        Ok(())
    }

    /// Frames emitted per channel. Channels advance together, so this is
    /// the slowest channel's cursor.
    pub fn emitted(&self) -> u64 {
        self.channels
            .iter()
            .map(|c| c.emitted())
            .min()
            .unwrap_or(0)
    }

    pub fn channels(&self) -> &[ReplayChannel] {
        &self.channels
    }

    pub fn channel(&self, name: &str) -> Option<&ReplayChannel> {
        self.channels.iter().find(|c| c.name() == name)
    }

    pub fn get_monitor(&self) -> ReplayMonitor {
        ReplayMonitor::new(self.metrics_collector.clone())
    }

    /// Release the sinks, in channel order
    pub fn into_sinks(self) -> Vec<(String, Box<dyn ChannelSink>)> {
        self.channels.into_iter().map(ReplayChannel::into_parts).collect()
    }
}
