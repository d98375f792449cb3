pub mod guarded_sink;
pub mod policy;

pub use guarded_sink::GuardedSink;
pub use policy::SinkErrorPolicy;
