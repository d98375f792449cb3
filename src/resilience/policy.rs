use serde::{Deserialize, Serialize};

/// What the scheduler does when a sink rejects a batch.
///
/// Either way the batch counts as emitted: the cursor has already moved and
/// the frames are never offered again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkErrorPolicy {
    /// Log the error and keep replaying
    #[default]
    LogAndContinue,

    /// Fail the tick, which ends the replay loop
    Halt,
}
