pub mod counters;
pub mod log;

pub use counters::PipelineCounters;
pub use log::LogManager;
