//! Per-request transport graph around an origin/destination pair

use hashbrown::{HashMap, HashSet};
use itertools::Itertools;
use log::{debug, warn};
use petgraph::graph::{DiGraph, NodeIndex};

use super::preferences::TripPreferences;
use crate::{
    Coordinate, Error, Line, LineId, MAX_CANDIDATE_STOPS, MAX_SEARCH_RADIUS_M, Minutes, Stop,
    StopId, TransitModel, TransportType, WALK_SPEED_M_PER_MIN,
    model::NearbyStop,
    simulation::{Vehicle, VehicleStatus},
    spatial::{haversine_distance, polyline_length},
};

/// Stops closer than this that share no line are joined by a transfer edge (meters)
pub const TRANSFER_RADIUS_M: f64 = 400.0;
/// Occupancy assumed for a line without live telemetry (percent)
pub const DEFAULT_OCCUPANCY: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Origin,
    Destination,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GraphNode {
    /// Ephemeral point supplied by the request
    UserLocation {
        role: NodeRole,
        coordinates: Coordinate,
    },
    Stop {
        stop_id: StopId,
        name: String,
        coordinates: Coordinate,
    },
}

impl GraphNode {
    pub fn coordinates(&self) -> Coordinate {
        match self {
            GraphNode::UserLocation { coordinates, .. } | GraphNode::Stop { coordinates, .. } => {
                *coordinates
            }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            GraphNode::UserLocation {
                role: NodeRole::Origin,
                ..
            } => "origin",
            GraphNode::UserLocation {
                role: NodeRole::Destination,
                ..
            } => "destination",
            GraphNode::Stop { name, .. } => name,
        }
    }

    pub fn stop_id(&self) -> Option<&str> {
        match self {
            GraphNode::Stop { stop_id, .. } => Some(stop_id),
            GraphNode::UserLocation { .. } => None,
        }
    }
}

/// Directed leg between two graph nodes
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub kind: TransportType,
    /// Line ridden, `None` for walking and transfers
    pub route_id: Option<LineId>,
    /// Meters
    pub distance: f64,
    pub time: Minutes,
    /// Estimated wait before boarding
    pub wait: Minutes,
    pub fare: f64,
    /// Expected crowding, 0-100
    pub occupancy: f64,
}

impl GraphEdge {
    pub(crate) fn walk(kind: TransportType, distance: f64) -> Self {
        Self {
            kind,
            route_id: None,
            distance,
            time: walking_time(distance),
            wait: 0.0,
            fare: 0.0,
            occupancy: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransportGraph {
    pub graph: DiGraph<GraphNode, GraphEdge>,
    pub origin: NodeIndex,
    pub destination: NodeIndex,
    stop_nodes: HashMap<StopId, NodeIndex>,
}

impl TransportGraph {
    pub fn stop_node(&self, stop_id: &str) -> Option<NodeIndex> {
        self.stop_nodes.get(stop_id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Minutes needed to walk `distance` meters, rounded up
pub fn walking_time(distance: f64) -> Minutes {
    (distance / WALK_SPEED_M_PER_MIN).ceil()
}

/// Builds the graph searched by the planner.
///
/// Access and egress stops are looked up around the two user locations, then
/// lines are added in rounds: the lines serving those stops first, then, once
/// per allowed transfer, the lines reachable on foot from stops already added.
pub fn build_transport_graph(
    model: &TransitModel,
    fleet: &[Vehicle],
    origin: Coordinate,
    destination: Coordinate,
    preferences: &TripPreferences,
) -> Result<TransportGraph, Error> {
    origin.validate()?;
    destination.validate()?;
    preferences.validate()?;

    let mut builder = GraphBuilder::new(model, fleet, origin, destination);
    let search_radius = preferences.max_walking_distance.min(MAX_SEARCH_RADIUS_M);

    let access = builder.candidate_stops(origin, search_radius, "origin");
    let egress = builder.candidate_stops(destination, search_radius, "destination");

    for candidate in &access {
        let node = builder.stop_node(candidate.stop);
        builder.graph.add_edge(
            builder.origin,
            node,
            GraphEdge::walk(TransportType::Walk, candidate.distance),
        );
    }
    for candidate in &egress {
        let node = builder.stop_node(candidate.stop);
        builder.graph.add_edge(
            node,
            builder.destination,
            GraphEdge::walk(TransportType::Walk, candidate.distance),
        );
    }

    let direct = haversine_distance(origin, destination);
    if direct <= search_radius {
        builder.graph.add_edge(
            builder.origin,
            builder.destination,
            GraphEdge::walk(TransportType::Walk, direct),
        );
    }

    let transfer_radius = TRANSFER_RADIUS_M.min(preferences.max_walking_distance);
    let mut frontier: Vec<&Stop> = access.iter().chain(&egress).map(|c| c.stop).collect();
    let mut added: HashSet<&str> = HashSet::new();

    for round in 0..=preferences.max_transfers {
        let mut new_lines: Vec<&Line> = Vec::new();
        for stop in &frontier {
            let reachable: Vec<&Stop> = if round == 0 {
                vec![*stop]
            } else {
                model
                    .catalog
                    .nearby_stops(stop.coordinates, transfer_radius)
                    .into_iter()
                    .map(|nearby| nearby.stop)
                    .collect()
            };
            for line in reachable
                .into_iter()
                .flat_map(|s| model.catalog.lines_for_stop(s))
            {
                if added.insert(line.id.as_str()) {
                    new_lines.push(line);
                }
            }
        }

        if new_lines.is_empty() {
            break;
        }
        debug!("Round {round}: adding {} line(s)", new_lines.len());

        frontier.clear();
        for line in new_lines {
            builder.add_line(line)?;
            frontier.extend(line.stops.iter().filter_map(|id| model.catalog.stop(id).ok()));
        }
    }

    builder.add_transfers(transfer_radius);

    let graph = builder.finish();
    debug!(
        "Transport graph built with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

struct GraphBuilder<'a> {
    model: &'a TransitModel,
    fleet: &'a [Vehicle],
    graph: DiGraph<GraphNode, GraphEdge>,
    origin: NodeIndex,
    destination: NodeIndex,
    stop_nodes: HashMap<StopId, NodeIndex>,
}

impl<'a> GraphBuilder<'a> {
    fn new(
        model: &'a TransitModel,
        fleet: &'a [Vehicle],
        origin: Coordinate,
        destination: Coordinate,
    ) -> Self {
        let mut graph = DiGraph::new();
        let origin = graph.add_node(GraphNode::UserLocation {
            role: NodeRole::Origin,
            coordinates: origin,
        });
        let destination = graph.add_node(GraphNode::UserLocation {
            role: NodeRole::Destination,
            coordinates: destination,
        });
        Self {
            model,
            fleet,
            graph,
            origin,
            destination,
            stop_nodes: HashMap::new(),
        }
    }

    /// Nearest stops within `radius`, or the single nearest stop as a fallback
    fn candidate_stops(
        &self,
        location: Coordinate,
        radius: f64,
        label: &str,
    ) -> Vec<NearbyStop<'a>> {
        let model = self.model;
        let mut stops = model.catalog.nearby_stops(location, radius);
        stops.truncate(MAX_CANDIDATE_STOPS);
        if stops.is_empty()
            && let Some(nearest) = model.catalog.nearest_stop(location)
        {
            warn!(
                "No stop within {radius} m of the {label}, falling back to {} at {:.0} m",
                nearest.stop.id, nearest.distance
            );
            stops.push(nearest);
        }
        stops
    }

    fn stop_node(&mut self, stop: &Stop) -> NodeIndex {
        if let Some(&node) = self.stop_nodes.get(&stop.id) {
            return node;
        }
        let node = self.graph.add_node(GraphNode::Stop {
            stop_id: stop.id.clone(),
            name: stop.name.clone(),
            coordinates: stop.coordinates,
        });
        self.stop_nodes.insert(stop.id.clone(), node);
        node
    }

    /// Adds a ride edge between every ordered pair of the line's stops
    fn add_line(&mut self, line: &Line) -> Result<(), Error> {
        let model = self.model;
        let stops = line
            .stops
            .iter()
            .map(|id| model.catalog.stop(id))
            .collect::<Result<Vec<_>, _>>()?;
        let offsets = self.polyline_offsets(line, &stops);
        let occupancy = self.line_occupancy(&line.id);

        for (i, from) in stops.iter().enumerate() {
            let wait = self.boarding_wait(line, from.coordinates);
            let from_node = self.stop_node(from);
            for (j, to) in stops.iter().enumerate() {
                if i == j || from.id == to.id {
                    continue;
                }
                let distance = match (offsets[i], offsets[j]) {
                    (Some(a), Some(b)) => (b - a).abs(),
                    _ => haversine_distance(from.coordinates, to.coordinates),
                };
                let hops = i.abs_diff(j) as f64;
                let to_node = self.stop_node(to);
                self.graph.add_edge(
                    from_node,
                    to_node,
                    GraphEdge {
                        kind: line.transport_type,
                        route_id: Some(line.id.clone()),
                        distance,
                        time: hops * line.minutes_between_stops,
                        wait,
                        fare: line.fare,
                        occupancy,
                    },
                );
            }
        }
        Ok(())
    }

    /// Distance along the line polyline from its first point to each stop,
    /// `None` where the stop has no station on the polyline
    fn polyline_offsets(&self, line: &Line, stops: &[&Stop]) -> Vec<Option<f64>> {
        let Ok(geometry) = self.model.geometry.get(&line.id) else {
            return vec![None; stops.len()];
        };
        let coords = &geometry.polyline.0;
        stops
            .iter()
            .map(|stop| {
                let station = geometry.station(&stop.name).ok()?;
                let prefix = geo::LineString::new(coords[..=station.index].to_vec());
                Some(polyline_length(&prefix))
            })
            .collect()
    }

    /// Average occupancy reported by active vehicles on the line
    fn line_occupancy(&self, line_id: &str) -> f64 {
        let (sum, count) = self
            .fleet
            .iter()
            .filter(|v| v.line_id == line_id && v.status == VehicleStatus::Active)
            .filter_map(|v| v.occupancy)
            .fold((0.0, 0usize), |(sum, count), occ| {
                (sum + f64::from(occ), count + 1)
            });
        if count == 0 {
            DEFAULT_OCCUPANCY
        } else {
            sum / count as f64
        }
    }

    /// Expected wait at a boarding point.
    ///
    /// Uses the closest moving vehicle's straight-line arrival time, capped at
    /// the headway, or half the headway when nothing is moving on the line.
    fn boarding_wait(&self, line: &Line, at: Coordinate) -> Minutes {
        self.fleet
            .iter()
            .filter(|v| {
                v.line_id == line.id && v.status == VehicleStatus::Active && v.speed > 0.0
            })
            .map(|v| {
                let meters_per_minute = v.speed * 1000.0 / 60.0;
                haversine_distance(v.position, at) / meters_per_minute
            })
            .min_by(f64::total_cmp)
            .map_or(line.headway / 2.0, |eta| eta.min(line.headway))
    }

    /// Walking transfers between nearby stops that have no line in common
    fn add_transfers(&mut self, radius: f64) {
        let model = self.model;
        let mut nodes: Vec<(NodeIndex, &Stop)> = self
            .stop_nodes
            .iter()
            .filter_map(|(id, &node)| Some((node, model.catalog.stop(id).ok()?)))
            .collect();
        nodes.sort_unstable_by_key(|&(node, _)| node);

        let mut count = 0;
        for (&(a_node, a), &(b_node, b)) in nodes.iter().tuple_combinations() {
            if a.lines.iter().any(|l| b.lines.contains(l)) {
                continue;
            }
            let distance = haversine_distance(a.coordinates, b.coordinates);
            if distance <= radius {
                let edge = GraphEdge::walk(TransportType::Transfer, distance);
                self.graph.add_edge(a_node, b_node, edge.clone());
                self.graph.add_edge(b_node, a_node, edge);
                count += 2;
            }
        }
        debug!("Added {count} transfer edge(s)");
    }

    fn finish(self) -> TransportGraph {
        TransportGraph {
            graph: self.graph,
            origin: self.origin,
            destination: self.destination,
            stop_nodes: self.stop_nodes,
        }
    }
}
