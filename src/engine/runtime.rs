use super::scheduler::ReplayScheduler;
use crate::observability::ReplayMonitor;
use crate::tick::TickSource;
use anyhow::{anyhow, Result};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Start `scheduler` and drive it from `ticks` on a spawned task.
///
/// The start time is captured here, once. The loop re-arms after every tick
/// until the returned handle stops it or the tick source goes away.
pub fn spawn<T>(mut scheduler: ReplayScheduler, mut ticks: T) -> Result<ReplayHandle>
where
    T: TickSource + 'static,
{
    scheduler.start(Instant::now())?;
    let monitor = scheduler.get_monitor();

    let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);

    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.recv() => break,

                tick = ticks.next_tick() => {
                    if let Err(e) = tick {
                        log::debug!("Tick source ended: {:#}", e);
                        break;
                    }
                    if let Err(e) = scheduler.tick(Instant::now()) {
                        log::error!("Replay loop halted: {:#}", e);
                        scheduler.stop(Instant::now())?;
                        return Err(e);
                    }
                }
            }
        }

        scheduler.stop(Instant::now())?;
        Ok::<_, anyhow::Error>(scheduler)
    });

    Ok(ReplayHandle {
        shutdown_tx,
        handle: Some(handle),
        monitor,
    })
}

/// Cancellation handle for a running replay loop
pub struct ReplayHandle {
    shutdown_tx: broadcast::Sender<()>,
    handle: Option<JoinHandle<Result<ReplayScheduler>>>,
    monitor: ReplayMonitor,
}

impl ReplayHandle {
    /// Live metrics of the running loop
    pub fn monitor(&self) -> &ReplayMonitor {
        &self.monitor
    }

    /// Whether the loop has exited on its own (tick source gone or a halting sink error)
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Stop rescheduling and wait for the loop to exit.
    ///
    /// Returns the stopped scheduler so its sinks can be released by the caller.
    pub async fn stop(mut self) -> Result<ReplayScheduler> {
        let _ = self.shutdown_tx.send(());

        let handle = self
            .handle
            .take()
            .ok_or_else(|| anyhow!("Replay loop already stopped"))?;
        handle.await?
    }
}

/// Dropping the handle stops the loop; the scheduler and its sinks are then
/// dropped on the loop task.
impl Drop for ReplayHandle {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
    }
}
