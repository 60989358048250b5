//! Synchronous A* over the classified link graph.

use std::collections::{BinaryHeap, HashMap, HashSet};

use skimmer_core::PortalId;

use crate::hop::HopModel;

/// Edge cost of an unflyable hop, and the g-score of an unvisited node.
pub const UNREACHABLE: f64 = f64::INFINITY;

/// Safety bound on reconstructed path length, guarding against corrupted or
/// cyclic predecessor chains. Callers must tolerate truncation at this size.
pub const MAX_PATH_LEN: usize = 2000;

/// Reference into the open set, ordered by `f` for use in `BinaryHeap`.
#[derive(Clone)]
pub(crate) struct NodeRef {
    pub(crate) id: PortalId,
    pub(crate) f: f64,
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.f.total_cmp(&other.f).is_eq()
    }
}

impl Eq for NodeRef {}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse so BinaryHeap (max-heap) pops smallest f first.
        other.f.total_cmp(&self.f)
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Outcome of expanding one open-set entry.
pub(crate) enum Advance {
    /// More work remains.
    Working,
    /// The goal was popped; the path can be reconstructed.
    Found,
    /// The open set ran dry without reaching the goal.
    Exhausted,
}

/// Mutable state of one A* run, shared between the synchronous and the
/// time-sliced front-ends.
pub(crate) struct SearchCore {
    open: BinaryHeap<NodeRef>,
    g: HashMap<PortalId, f64>,
    parents: HashMap<PortalId, PortalId>,
    closed: HashSet<PortalId>,
    goal: PortalId,
}

impl SearchCore {
    pub(crate) fn new(model: &HopModel<'_>, start: &PortalId, goal: &PortalId) -> Self {
        let mut core = Self {
            open: BinaryHeap::new(),
            g: HashMap::new(),
            parents: HashMap::new(),
            closed: HashSet::new(),
            goal: goal.clone(),
        };
        core.g.insert(start.clone(), 0.0);
        core.open.push(NodeRef {
            id: start.clone(),
            f: model.estimate(start, goal),
        });
        core
    }

    /// Pop and relax one open-set entry.
    pub(crate) fn advance(&mut self, model: &HopModel<'_>) -> Advance {
        let Some(current) = self.open.pop() else {
            return Advance::Exhausted;
        };

        // Skip entries superseded by a cheaper re-discovery.
        if !self.closed.insert(current.id.clone()) {
            return Advance::Working;
        }
        if current.id == self.goal {
            return Advance::Found;
        }

        let current_g = self.g[&current.id];
        for neighbor in model.neighbors(&current.id) {
            if self.closed.contains(neighbor) {
                continue;
            }
            let cost = model.cost(&current.id, neighbor);
            if cost == UNREACHABLE {
                continue;
            }
            let tentative = current_g + cost;
            if tentative >= *self.g.get(neighbor).unwrap_or(&UNREACHABLE) {
                continue;
            }
            self.g.insert(neighbor.clone(), tentative);
            self.parents.insert(neighbor.clone(), current.id.clone());
            self.open.push(NodeRef {
                id: neighbor.clone(),
                f: tentative + model.estimate(neighbor, &self.goal),
            });
        }
        Advance::Working
    }

    /// Walk the predecessor chain back from the goal.
    ///
    /// Truncates at [`MAX_PATH_LEN`] nodes.
    pub(crate) fn path(&self) -> Vec<PortalId> {
        let mut path = vec![self.goal.clone()];
        let mut current = &self.goal;
        while let Some(parent) = self.parents.get(current) {
            if path.len() >= MAX_PATH_LEN {
                break;
            }
            path.push(parent.clone());
            current = parent;
        }
        path.reverse();
        path
    }
}

/// Minimum-cost path from `start` to `goal` under the model's cost and
/// heuristic, including both endpoints.
///
/// Returns an empty vector when `goal` is unreachable — an expected
/// outcome, not an error. `[start]` when start and goal coincide.
pub fn astar_path(model: &HopModel<'_>, start: &PortalId, goal: &PortalId) -> Vec<PortalId> {
    if !model.graph().contains(start) || !model.graph().contains(goal) {
        return Vec::new();
    }
    if start == goal {
        return vec![start.clone()];
    }

    let mut core = SearchCore::new(model, start, goal);
    loop {
        match core.advance(model) {
            Advance::Working => {}
            Advance::Found => return core.path(),
            Advance::Exhausted => return Vec::new(),
        }
    }
}
