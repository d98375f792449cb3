use anyhow::{anyhow, Result};
use crossbeam_channel::TryRecvError;
use spectro_replay::core::{ChannelSink, Frame, FrameBatch};
use spectro_replay::engine::{self, ChannelDescriptor, EmissionSchedule, ReplayScheduler};
use spectro_replay::resilience::SinkErrorPolicy;
use spectro_replay::sinks::ForwardSink;
use spectro_replay::tick::{IntervalTicker, ManualTicker};
use std::sync::{Arc, Mutex};
use tokio::time::{advance, Duration};
use tokio_test::assert_ok;

struct CountingSink {
    frames: Arc<Mutex<u64>>,
}

impl ChannelSink for CountingSink {
    fn kind(&self) -> &str {
        "counting"
    }

    fn accept(&mut self, batch: FrameBatch) -> Result<()> {
        *self.frames.lock().unwrap() += batch.len() as u64;
        Ok(())
    }
}

struct RejectingSink;

impl ChannelSink for RejectingSink {
    fn kind(&self) -> &str {
        "rejecting"
    }

    fn accept(&mut self, _batch: FrameBatch) -> Result<()> {
        Err(anyhow!("renderer rejected batch"))
    }
}

fn frames(count: usize) -> Arc<[Frame]> {
    (0..count)
        .map(|i| Frame::from(vec![i as f64; 3]))
        .collect::<Vec<_>>()
        .into()
}

fn scheduler(sink: Box<dyn ChannelSink>, policy: SinkErrorPolicy) -> ReplayScheduler {
    let descriptor = ChannelDescriptor::new("Channel 1", frames(500), sink).unwrap();
    let schedule = EmissionSchedule::new(35.0, 100).unwrap();
    ReplayScheduler::new(schedule, vec![descriptor], policy).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_manual_ticks_follow_schedule() -> Result<()> {
    let (sink, rx) = ForwardSink::bounded(16);
    let (ticker, trigger) = ManualTicker::new();
    let handle = engine::spawn(scheduler(Box::new(sink), SinkErrorPolicy::Halt), ticker)?;

    advance(Duration::from_millis(1000)).await;
    trigger.tick().await?;

    let batch = rx.try_recv()?;
    assert_eq!(batch.len(), 35);
    assert_eq!(batch.start_sequence, 0);

    // No time has passed: nothing new is due
    trigger.tick().await?;
    assert!(rx.try_recv().is_err());

    advance(Duration::from_millis(10_000)).await;
    trigger.tick().await?;
    trigger.tick().await?;
    let first = rx.try_recv()?;
    let second = rx.try_recv()?;
    assert_eq!((first.start_sequence, first.len()), (35, 100));
    assert_eq!((second.start_sequence, second.len()), (135, 100));

    let scheduler = handle.stop().await?;
    assert_eq!(scheduler.state().name(), "Stopped");
    assert_eq!(scheduler.emitted(), 235);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_interval_ticker_paces_replay() -> Result<()> {
    let count = Arc::new(Mutex::new(0));
    let sink = CountingSink {
        frames: count.clone(),
    };
    let handle = engine::spawn(
        scheduler(Box::new(sink), SinkErrorPolicy::Halt),
        IntervalTicker::new(60.0)?,
    )?;

    tokio::time::sleep(Duration::from_millis(1000)).await;
    let scheduler = handle.stop().await?;

    let emitted = *count.lock().unwrap();
    assert!((33..=35).contains(&emitted), "emitted {} frames in 1s", emitted);
    assert_eq!(scheduler.emitted(), emitted);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_stop_releases_sinks() -> Result<()> {
    let (sink, rx) = ForwardSink::bounded(4);
    let (ticker, _trigger) = ManualTicker::new();
    let handle = engine::spawn(scheduler(Box::new(sink), SinkErrorPolicy::default()), ticker)?;

    let scheduler = assert_ok!(handle.stop().await);
    let sinks = scheduler.into_sinks();
    assert_eq!(sinks.len(), 1);
    assert_eq!(sinks[0].0, "Channel 1");
    drop(sinks);

    // Sender side is gone once the sink is released
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Disconnected)));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_stops_loop() -> Result<()> {
    let (sink, rx) = ForwardSink::bounded(4);
    let (ticker, trigger) = ManualTicker::new();
    let handle = engine::spawn(scheduler(Box::new(sink), SinkErrorPolicy::default()), ticker)?;

    drop(handle);

    // Ticks stop being accepted once the loop has exited
    let mut attempts = 0;
    while trigger.tick().await.is_ok() {
        attempts += 1;
        assert!(attempts < 10, "loop kept running after its handle was dropped");
    }
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Disconnected)));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_closed_tick_source_ends_loop() -> Result<()> {
    let (ticker, trigger) = ManualTicker::new();
    let (sink, _rx) = ForwardSink::bounded(4);
    let handle = engine::spawn(scheduler(Box::new(sink), SinkErrorPolicy::default()), ticker)?;

    drop(trigger);
    while !handle.is_finished() {
        tokio::task::yield_now().await;
    }

    let scheduler = handle.stop().await?;
    assert_eq!(scheduler.state().name(), "Stopped");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_halting_sink_error_surfaces_on_stop() -> Result<()> {
    let (ticker, trigger) = ManualTicker::new();
    let handle = engine::spawn(scheduler(Box::new(RejectingSink), SinkErrorPolicy::Halt), ticker)?;

    advance(Duration::from_millis(100)).await;
    trigger.tick().await?;

    assert!(handle.is_finished());
    let err = handle.stop().await.err().expect("halting sink error");
    assert!(format!("{:#}", err).contains("renderer rejected batch"));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_monitor_reports_live_counts() -> Result<()> {
    let (sink, _rx) = ForwardSink::bounded(16);
    let (ticker, trigger) = ManualTicker::new();
    let handle = engine::spawn(scheduler(Box::new(sink), SinkErrorPolicy::default()), ticker)?;

    advance(Duration::from_millis(2000)).await;
    trigger.tick().await?;

    let report = handle.monitor().generate_report();
    assert!(report.contains("Channel 1"));
    assert!(report.contains("70 frames in 1 batches"));

    handle.stop().await?;
    Ok(())
}
