use serde::{Deserialize, Serialize};
use tokio::time::{Duration, Instant};

/// Replay scheduler lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SchedulerState {
    /// Built from a loaded dataset, not ticking yet
    #[default]
    Idle,
    Running {
        #[serde(skip)]
        start_time: Option<Instant>,
        ticks: u64,
    },
    /// Torn down through the replay handle
    Stopped {
        #[serde(skip)]
        duration: Option<Duration>,
        total_ticks: u64,
    },
}

impl SchedulerState {
    /// Check if transition from current state to target state is valid
    pub fn can_transition_to(&self, target: &SchedulerState) -> bool {
        use SchedulerState::*;

        matches!(
            (self, target),
            (Idle, Running { .. }) | (Running { .. }, Stopped { .. })
        )
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Idle => "Idle",
            Self::Running { .. } => "Running",
            Self::Stopped { .. } => "Stopped",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}
