pub mod stats;

pub use stats::{GeoBounds, GeoPoint, StatsHelper};
