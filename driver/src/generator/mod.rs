pub mod tracks;

pub use tracks::{build_track_csv, GeneratorConfig};
