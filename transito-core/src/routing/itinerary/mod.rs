//! Planner output: consolidated, human-readable trip segments

mod to_geojson;

use petgraph::graph::NodeIndex;
use serde::Serialize;

use super::graph::{GraphEdge, GraphNode, NodeRole, TransportGraph};
use crate::{Coordinate, LineId, Minutes, StopId, TransitModel, TransportType, spatial};

/// Legs longer than this get a synthetic midpoint in their path (meters)
const MIDPOINT_THRESHOLD_M: f64 = 1_000.0;
/// Offset applied to the synthetic midpoint of ride legs (degrees)
const MIDPOINT_OFFSET_DEG: f64 = 0.002;

/// Reference to a node of the graph the itinerary was computed on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum NodeRef {
    Origin,
    Destination,
    Stop {
        #[serde(rename = "stopId")]
        stop_id: StopId,
    },
}

impl From<&GraphNode> for NodeRef {
    fn from(node: &GraphNode) -> Self {
        match node {
            GraphNode::UserLocation {
                role: NodeRole::Origin,
                ..
            } => NodeRef::Origin,
            GraphNode::UserLocation {
                role: NodeRole::Destination,
                ..
            } => NodeRef::Destination,
            GraphNode::Stop { stop_id, .. } => NodeRef::Stop {
                stop_id: stop_id.clone(),
            },
        }
    }
}

/// One consolidated leg of a trip
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    #[serde(rename = "type")]
    pub kind: TransportType,
    pub route_id: Option<LineId>,
    pub route_name: Option<String>,
    pub from: NodeRef,
    pub to: NodeRef,
    pub from_name: String,
    pub to_name: String,
    /// Travel time, excluding the wait
    pub time: Minutes,
    pub wait_time: Minutes,
    /// Meters
    pub distance: f64,
    pub fare: f64,
    pub path: Vec<Coordinate>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    /// Travel plus waiting time, in minutes
    pub total_time: Minutes,
    /// Meters
    pub total_distance: f64,
    pub total_cost: f64,
    pub transfer_count: usize,
    pub segments: Vec<Segment>,
}

/// Edge taken by the search, with the wait and fare actually charged
#[derive(Debug, Clone, Copy)]
pub(crate) struct Leg<'a> {
    pub from: NodeIndex,
    pub to: NodeIndex,
    pub edge: &'a GraphEdge,
    pub wait: Minutes,
    pub fare: f64,
}

/// Run of legs sharing mode and line, before rendering
struct Run {
    kind: TransportType,
    route_id: Option<LineId>,
    from: NodeIndex,
    to: NodeIndex,
    time: Minutes,
    wait: Minutes,
    distance: f64,
    fare: f64,
}

impl Itinerary {
    pub(crate) fn from_legs(
        model: &TransitModel,
        graph: &TransportGraph,
        legs: &[Leg<'_>],
        transfer_count: usize,
    ) -> Self {
        let segments: Vec<Segment> = consolidate(legs)
            .into_iter()
            .map(|run| render(model, graph, run))
            .collect();

        Self {
            total_time: segments.iter().map(|s| s.time + s.wait_time).sum(),
            total_distance: segments.iter().map(|s| s.distance).sum(),
            total_cost: segments.iter().map(|s| s.fare).sum(),
            transfer_count,
            segments,
        }
    }

    /// Segments travelled on board a vehicle
    pub fn ride_segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.kind.is_ride())
    }
}

fn consolidate(legs: &[Leg<'_>]) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for leg in legs {
        if let Some(last) = runs.last_mut()
            && last.kind == leg.edge.kind
            && last.route_id == leg.edge.route_id
        {
            last.to = leg.to;
            last.time += leg.edge.time;
            last.wait += leg.wait;
            last.distance += leg.edge.distance;
            last.fare += leg.fare;
            continue;
        }
        runs.push(Run {
            kind: leg.edge.kind,
            route_id: leg.edge.route_id.clone(),
            from: leg.from,
            to: leg.to,
            time: leg.edge.time,
            wait: leg.wait,
            distance: leg.edge.distance,
            fare: leg.fare,
        });
    }
    runs
}

fn render(model: &TransitModel, graph: &TransportGraph, run: Run) -> Segment {
    let from = &graph.graph[run.from];
    let to = &graph.graph[run.to];

    let route_name = run
        .route_id
        .as_deref()
        .and_then(|id| model.catalog.line(id).ok())
        .map(|line| line.name.clone());

    let path = ride_path(model, &run, from, to).unwrap_or_else(|| {
        straight_path(run.kind, run.distance, from.coordinates(), to.coordinates())
    });

    let mut segment = Segment {
        kind: run.kind,
        route_id: run.route_id,
        route_name,
        from: from.into(),
        to: to.into(),
        from_name: from.name().to_string(),
        to_name: to.name().to_string(),
        time: run.time,
        wait_time: run.wait,
        distance: run.distance,
        fare: run.fare,
        path,
        description: String::new(),
    };
    segment.description = describe(&segment);
    segment
}

/// Polyline slice for rides on lines with stored geometry
fn ride_path(
    model: &TransitModel,
    run: &Run,
    from: &GraphNode,
    to: &GraphNode,
) -> Option<Vec<Coordinate>> {
    let route_id = run.route_id.as_deref()?;
    if !run.kind.is_ride() || !model.geometry.contains(route_id) {
        return None;
    }
    model
        .ride_path(route_id, from.stop_id()?, to.stop_id()?)
        .ok()
        .filter(|path| path.len() >= 2)
}

/// Two or three point approximation of a leg
fn straight_path(
    kind: TransportType,
    distance: f64,
    from: Coordinate,
    to: Coordinate,
) -> Vec<Coordinate> {
    let mut path = vec![from];
    if distance > MIDPOINT_THRESHOLD_M {
        let offset = if kind == TransportType::Walk {
            0.0
        } else {
            MIDPOINT_OFFSET_DEG
        };
        let mid = spatial::interpolate(from, to, 0.5);
        path.push(Coordinate::new(mid.latitude + offset, mid.longitude - offset));
    }
    path.push(to);
    path
}

fn describe(segment: &Segment) -> String {
    let route = segment
        .route_name
        .as_deref()
        .or(segment.route_id.as_deref())
        .unwrap_or_default();
    let vehicle = match segment.kind {
        TransportType::Walk => {
            return format!(
                "Walk {:.2} km (approx. {} min) from {} to {}",
                segment.distance / 1000.0,
                segment.time,
                segment.from_name,
                segment.to_name
            );
        }
        TransportType::Transfer => {
            return format!("Transfer from {} to {}", segment.from_name, segment.to_name);
        }
        TransportType::Bus => "bus",
        TransportType::Minibus => "minibus",
        TransportType::Metro => "metro",
    };
    format!(
        "Take the {vehicle} {route} at {} and get off at {} ({} min)",
        segment.from_name, segment.to_name, segment.time
    )
}
