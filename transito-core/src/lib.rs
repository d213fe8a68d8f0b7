//! Real-time transit tracking and multimodal trip planning.
//!
//! The crate has two halves that share the same reference data:
//! a per-request route planner (graph builder + multi-criteria search)
//! and a long-lived vehicle motion simulator.

pub mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;
pub mod simulation;
pub mod spatial;

pub use error::Error;
pub use model::{
    Coordinate, Line, LineGeometry, LineGeometryStore, Stop, TransitCatalog, TransitModel,
    TransportType,
};
pub use routing::{Itinerary, Segment, TripPreferences, find_route, plan_trip};
pub use simulation::{Simulator, TelemetryUpdate, Vehicle, VehicleStatus};

/// Identifier of a stop in the reference catalog
pub type StopId = String;
/// Identifier of a line (route) in the reference catalog
pub type LineId = String;
/// Identifier of a simulated vehicle
pub type VehicleId = String;
/// Durations are expressed in minutes
pub type Minutes = f64;

/// Maximum number of access/egress stops considered per user location
pub const MAX_CANDIDATE_STOPS: usize = 12;
/// Hard cap on the radius used to search stops around a user location (meters)
pub const MAX_SEARCH_RADIUS_M: f64 = 3_000.0;
/// Pedestrian speed, meters per minute (~5 km/h)
pub const WALK_SPEED_M_PER_MIN: f64 = 83.33;
