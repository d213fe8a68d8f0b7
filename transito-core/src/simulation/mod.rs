//! Live vehicles moving along line polylines

mod simulator;
mod telemetry;
mod vehicle;

pub use simulator::Simulator;
pub use telemetry::TelemetryUpdate;
pub use vehicle::{Vehicle, VehicleStatus};
