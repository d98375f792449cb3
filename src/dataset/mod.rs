pub mod loader;

pub use loader::{ChannelFrames, Dataset};
