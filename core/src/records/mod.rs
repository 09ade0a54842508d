pub mod parser;
pub mod record;
pub mod timestamp;

pub use parser::RecordParser;
pub use record::{group_tracks, Dataset, LocationRecord, SkippedRow, Track};
pub use timestamp::parse_timestamp;
