pub mod config;
pub mod core;
pub mod dataset;
pub mod engine;
pub mod observability;
pub mod resilience;
pub mod sinks;
pub mod tick;
