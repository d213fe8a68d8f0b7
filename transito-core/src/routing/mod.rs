pub mod graph;
pub mod itinerary;
mod planner;
mod preferences;

pub use graph::{
    DEFAULT_OCCUPANCY, GraphEdge, GraphNode, NodeRole, TRANSFER_RADIUS_M, TransportGraph,
    build_transport_graph, walking_time,
};
pub use itinerary::{Itinerary, NodeRef, Segment};
pub use planner::find_route;
pub use preferences::TripPreferences;

use log::info;

use crate::{Coordinate, Error, TransitModel, simulation::Vehicle};

/// Builds the transport graph for a request and searches it.
///
/// `Ok(None)` means no route satisfies the preferences.
pub fn plan_trip(
    model: &TransitModel,
    fleet: &[Vehicle],
    origin: Coordinate,
    destination: Coordinate,
    preferences: &TripPreferences,
) -> Result<Option<Itinerary>, Error> {
    let graph = build_transport_graph(model, fleet, origin, destination, preferences)?;
    let itinerary = find_route(model, &graph, graph.origin, graph.destination, preferences);

    match &itinerary {
        Some(found) => info!(
            "Trip planned: {} segment(s), {:.0} min, {} transfer(s)",
            found.segments.len(),
            found.total_time,
            found.transfer_count
        ),
        None => info!(
            "No route from ({}, {}) to ({}, {})",
            origin.latitude, origin.longitude, destination.latitude, destination.longitude
        ),
    }
    Ok(itinerary)
}
