use std::cmp::Ordering;

use petgraph::graph::NodeIndex;

/// Node together with the part of its history that limits where it can go
/// next. Two arrivals at the same stop with different keys never replace
/// each other.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(super) struct Key {
    pub(super) node: NodeIndex,
    /// Vehicles boarded so far, continuations excluded
    pub(super) boardings: usize,
    /// Arrived by walking or transferring
    pub(super) on_foot: bool,
}

impl Key {
    pub(super) fn transfers(self) -> usize {
        self.boardings.saturating_sub(1)
    }

    /// Position of the key in a dense bitset sized for `max_boardings`
    pub(super) fn slot(self, max_boardings: usize) -> usize {
        (self.node.index() * (max_boardings + 1) + self.boardings) * 2 + usize::from(self.on_foot)
    }
}

#[derive(Copy, Clone, Debug)]
pub(super) struct State {
    pub(super) score: f64,
    /// Discovery order, earlier wins ties
    pub(super) seq: u64,
    pub(super) key: Key,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by score, then by discovery order
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}
