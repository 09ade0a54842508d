//! Core pipeline for the animal migration visualizer.
//!
//! Movebank-style CSV exports are parsed into typed location records,
//! filtered by tracked subject and rendered as either a static map view or
//! a bucketed timeline of frames. [`session::Session`] ties the stages
//! together as an explicit state store driven by user events.

pub mod config;
pub mod math;
pub mod prelude;
pub mod records;
pub mod render;
pub mod sample;
pub mod selection;
pub mod session;
pub mod telemetry;

pub use config::{ColumnMapping, SessionConfig};
pub use prelude::{MapRenderer, MigrationError, MigrationResult, RowError};
