use anyhow::Result;
use async_trait::async_trait;

/// Host "next display refresh" primitive.
///
/// `next_tick` resolves once per refresh. It promises nothing about timing
/// beyond "after the next refresh", so the scheduler reads the clock itself.
/// An error means the host is gone and the replay loop should end.
#[async_trait]
pub trait TickSource: Send {
    async fn next_tick(&mut self) -> Result<()>;
}
