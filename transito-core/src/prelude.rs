pub use crate::{MAX_CANDIDATE_STOPS, MAX_SEARCH_RADIUS_M, WALK_SPEED_M_PER_MIN};

// Re-export key components
pub use crate::loading::{TransitModelConfig, create_transit_model};
pub use crate::model::{Coordinate, Stop, TransitModel, TransportType};
pub use crate::routing::{Itinerary, Segment, TripPreferences, find_route, plan_trip};
pub use crate::simulation::{Simulator, TelemetryUpdate, Vehicle, VehicleStatus};

// Identifiers and units
pub use crate::LineId;
pub use crate::Minutes;
pub use crate::StopId;
pub use crate::VehicleId;
