pub mod model;
pub mod server;

pub use model::{SessionSummary, VisualizationModel};
pub use server::BridgeServer;
