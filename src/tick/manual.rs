use super::TickSource;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

/// Ticker driven by explicit calls to [`TickTrigger::tick`]
pub struct ManualTicker {
    rx: mpsc::Receiver<oneshot::Sender<()>>,
    pending: Option<oneshot::Sender<()>>,
}

/// Cloneable handle that fires ticks on a [`ManualTicker`]
#[derive(Clone)]
pub struct TickTrigger {
    tx: mpsc::Sender<oneshot::Sender<()>>,
}

impl ManualTicker {
    pub fn new() -> (Self, TickTrigger) {
        let (tx, rx) = mpsc::channel(10);
        (Self { rx, pending: None }, TickTrigger { tx })
    }
}

impl TickTrigger {
    /// Fire one tick and wait until the loop has finished handling it.
    ///
    /// Also returns once the loop has shut down, since nothing is left to wait for.
    pub async fn tick(&self) -> Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(done_tx)
            .await
            .map_err(|_| anyhow!("Replay loop is no longer listening for ticks"))?;
        let _ = done_rx.await;
        Ok(())
    }
}

#[async_trait]
impl TickSource for ManualTicker {
    async fn next_tick(&mut self) -> Result<()> {
        // Being asked for the next tick means the previous one was fully handled
        if let Some(done) = self.pending.take() {
            let _ = done.send(());
        }

        let done = self
            .rx
            .recv()
            .await
            .ok_or_else(|| anyhow!("Manual tick channel closed"))?;
        self.pending = Some(done);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_closed_trigger_ends_ticks() {
        let (mut ticker, trigger) = ManualTicker::new();
        drop(trigger);
        assert!(ticker.next_tick().await.is_err());
    }
}
