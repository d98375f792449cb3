pub mod channel;
pub mod cursor;
pub mod runtime;
pub mod schedule;
pub mod scheduler;
pub mod state;

pub use channel::{ChannelDescriptor, ReplayChannel};
pub use cursor::ReplayCursor;
pub use runtime::{spawn, ReplayHandle};
pub use schedule::EmissionSchedule;
pub use scheduler::{ReplayScheduler, TickReport};
pub use state::SchedulerState;
