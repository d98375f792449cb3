pub mod frame;
pub mod sink;

pub use frame::{Frame, FrameBatch};
pub use sink::ChannelSink;
