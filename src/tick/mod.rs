pub mod interval;
pub mod manual;
pub mod traits;

pub use interval::IntervalTicker;
pub use manual::{ManualTicker, TickTrigger};
pub use traits::TickSource;
