//! Weighted shortest-path search over the transport graph

mod state;

use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use hashbrown::HashMap;
use log::trace;
use petgraph::{
    graph::{EdgeIndex, NodeIndex},
    visit::EdgeRef,
};

use self::state::{Key, State};
use super::{
    graph::{GraphEdge, TransportGraph},
    itinerary::{Itinerary, Leg},
    preferences::{TripPreferences, Weights},
};
use crate::TransitModel;

/// Fare is multiplied by this to be commensurate with minutes
const COST_FACTOR: f64 = 5.0;
/// Occupancy fraction is multiplied by this
const OCCUPANCY_FACTOR: f64 = 20.0;
/// Score added for each transfer
const TRANSFER_PENALTY: f64 = 15.0;

/// Best known way to reach a search key
#[derive(Debug, Clone, Copy)]
struct Label {
    score: f64,
    via: Option<Via>,
}

/// Edge used to reach a key, with its effective wait and fare
#[derive(Debug, Clone, Copy)]
struct Via {
    edge: EdgeIndex,
    from: Key,
    wait: f64,
    fare: f64,
}

/// Finds the best path from `source` to `target` under the given preferences.
///
/// Returns `None` when the target cannot be reached without breaking a hard
/// constraint.
pub fn find_route(
    model: &TransitModel,
    graph: &TransportGraph,
    source: NodeIndex,
    target: NodeIndex,
    preferences: &TripPreferences,
) -> Option<Itinerary> {
    let (labels, reached) = search(graph, source, target, preferences)?;

    let mut legs = Vec::new();
    let mut current = reached;
    while let Some(via) = labels.get(&current).and_then(|label| label.via) {
        legs.push(Leg {
            from: via.from.node,
            to: current.node,
            edge: &graph.graph[via.edge],
            wait: via.wait,
            fare: via.fare,
        });
        current = via.from;
    }
    legs.reverse();

    Some(Itinerary::from_legs(
        model,
        graph,
        &legs,
        reached.transfers(),
    ))
}

fn search(
    graph: &TransportGraph,
    source: NodeIndex,
    target: NodeIndex,
    preferences: &TripPreferences,
) -> Option<(HashMap<Key, Label>, Key)> {
    let weights = preferences.weights();
    let graph = &graph.graph;
    // A path never needs more boardings than there are nodes
    let max_boardings = preferences
        .max_transfers
        .saturating_add(1)
        .min(graph.node_count());

    let mut labels: HashMap<Key, Label> = HashMap::with_capacity(graph.node_count());
    let mut visited = FixedBitSet::with_capacity(graph.node_count() * (max_boardings + 1) * 2);
    let mut heap = BinaryHeap::new();
    let mut seq = 0u64;

    let start = Key {
        node: source,
        boardings: 0,
        on_foot: false,
    };
    labels.insert(
        start,
        Label {
            score: 0.0,
            via: None,
        },
    );
    heap.push(State {
        score: 0.0,
        seq,
        key: start,
    });

    while let Some(State { score, key, .. }) = heap.pop() {
        if visited.contains(key.slot(max_boardings)) {
            continue;
        }
        visited.insert(key.slot(max_boardings));

        if key.node == target {
            trace!(
                "Reached target with score {score:.2} after {} boarding(s)",
                key.boardings
            );
            return Some((labels, key));
        }

        let label = labels[&key];
        let previous = label.via.map(|via| &graph[via.edge]);

        for edge in graph.edges(key.node) {
            let Some(step) = relax(edge.weight(), previous, key.boardings, preferences, weights)
            else {
                continue;
            };
            if step.boardings > max_boardings {
                continue;
            }
            let next = Key {
                node: edge.target(),
                boardings: step.boardings,
                on_foot: edge.weight().kind.is_on_foot(),
            };
            if visited.contains(next.slot(max_boardings)) {
                continue;
            }

            let next_label = Label {
                score: label.score + step.score,
                via: Some(Via {
                    edge: edge.id(),
                    from: key,
                    wait: step.wait,
                    fare: step.fare,
                }),
            };

            // Add or update the label if better using Entry API
            match labels.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_label);
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_label.score < entry.get().score {
                        *entry.get_mut() = next_label;
                    } else {
                        continue;
                    }
                }
            }
            seq += 1;
            heap.push(State {
                score: next_label.score,
                seq,
                key: next,
            });
        }
    }

    None
}

/// Outcome of traversing one edge
struct Step {
    score: f64,
    wait: f64,
    fare: f64,
    /// Boardings after the edge
    boardings: usize,
}

fn relax(
    edge: &GraphEdge,
    previous: Option<&GraphEdge>,
    boardings: usize,
    preferences: &TripPreferences,
    weights: Weights,
) -> Option<Step> {
    if !preferences.allows(edge.kind) {
        return None;
    }
    if edge.kind.is_on_foot() {
        // Consecutive legs on foot would render as one leg longer than either
        if edge.distance > preferences.max_walking_distance
            || previous.is_some_and(|prev| prev.kind.is_on_foot())
        {
            return None;
        }
    }

    let continuation = edge.kind.is_ride()
        && previous.is_some_and(|prev| prev.kind.is_ride() && prev.route_id == edge.route_id);
    let boards = edge.kind.is_ride() && !continuation;
    let is_transfer = boards && boardings > 0;
    let boardings = boardings + usize::from(boards);
    if boardings.saturating_sub(1) > preferences.max_transfers {
        return None;
    }

    // Staying aboard the same line costs neither a new wait nor a new fare
    let (wait, fare) = if continuation {
        (0.0, 0.0)
    } else {
        (edge.wait, edge.fare)
    };

    let score = (edge.time + wait) * weights.time
        + fare * weights.cost * COST_FACTOR
        + (edge.occupancy / 100.0) * weights.occupancy * OCCUPANCY_FACTOR
        + if is_transfer { TRANSFER_PENALTY } else { 0.0 };

    Some(Step {
        score,
        wait,
        fare,
        boardings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransportType;

    fn ride(route: &str, wait: f64, fare: f64) -> GraphEdge {
        GraphEdge {
            kind: TransportType::Bus,
            route_id: Some(route.to_string()),
            distance: 1_000.0,
            time: 5.0,
            wait,
            fare,
            occupancy: 50.0,
        }
    }

    fn on_foot(kind: TransportType, distance: f64) -> GraphEdge {
        GraphEdge::walk(kind, distance)
    }

    #[test]
    fn score_combines_weighted_criteria() {
        let prefs = TripPreferences::default();
        let step = relax(&ride("R1", 2.0, 10.0), None, 0, &prefs, prefs.weights()).unwrap();
        // (5 + 2) * 3 + 10 * 5 + 0.5 * 20
        assert_eq!(step.score, 81.0);
        assert_eq!(step.boardings, 1);
    }

    #[test]
    fn same_line_continuation_is_free_of_wait_and_fare() {
        let prefs = TripPreferences::default();
        let previous = ride("R1", 2.0, 10.0);
        let step = relax(
            &ride("R1", 2.0, 10.0),
            Some(&previous),
            1,
            &prefs,
            prefs.weights(),
        )
        .unwrap();
        assert_eq!(step.wait, 0.0);
        assert_eq!(step.fare, 0.0);
        assert_eq!(step.boardings, 1);
    }

    #[test]
    fn boarding_another_line_counts_a_transfer() {
        let prefs = TripPreferences {
            max_transfers: 0,
            ..Default::default()
        };
        let previous = ride("R1", 2.0, 10.0);
        let step = relax(
            &ride("R2", 2.0, 10.0),
            Some(&previous),
            1,
            &prefs,
            prefs.weights(),
        );
        assert!(step.is_none());

        let allowed = TripPreferences::default();
        let step = relax(
            &ride("R2", 2.0, 10.0),
            Some(&previous),
            1,
            &allowed,
            allowed.weights(),
        )
        .unwrap();
        assert_eq!(step.boardings, 2);
        // (5 + 2) * 3 + 10 * 5 + 0.5 * 20 + 15
        assert_eq!(step.score, 96.0);
    }

    #[test]
    fn long_walks_and_disallowed_modes_are_rejected() {
        let prefs = TripPreferences {
            max_walking_distance: 500.0,
            transport_types: vec![TransportType::Walk, TransportType::Metro],
            ..Default::default()
        };
        let walk = on_foot(TransportType::Walk, 600.0);
        assert!(relax(&walk, None, 0, &prefs, prefs.weights()).is_none());
        assert!(relax(&ride("R1", 1.0, 1.0), None, 0, &prefs, prefs.weights()).is_none());
    }

    #[test]
    fn legs_on_foot_never_follow_each_other() {
        let prefs = TripPreferences::default();
        let weights = prefs.weights();
        let walk = on_foot(TransportType::Walk, 200.0);
        let transfer = on_foot(TransportType::Transfer, 200.0);

        for (edge, previous) in [
            (&transfer, &transfer),
            (&walk, &transfer),
            (&transfer, &walk),
            (&walk, &walk),
        ] {
            assert!(
                relax(edge, Some(previous), 1, &prefs, weights).is_none(),
                "{} after {} accepted",
                edge.kind,
                previous.kind
            );
        }

        let after_ride = ride("R1", 0.0, 0.0);
        assert!(relax(&transfer, Some(&after_ride), 1, &prefs, weights).is_some());
    }
}
