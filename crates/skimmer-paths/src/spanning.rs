//! Spanning-tree traversal and furthest-point discovery.

use std::collections::{HashMap, HashSet, VecDeque};

use skimmer_core::{PortalId, haversine_m};

use crate::hop::HopModel;

/// Result of a spanning-tree run: predecessor links for every reached
/// portal, and the reached portal farthest (straight-line) from the start.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanningTree {
    /// Predecessor per reached portal; the start maps to `None`.
    /// Empty when the start has no reachable neighbor at all.
    pub parents: HashMap<PortalId, Option<PortalId>>,
    /// The reached portal with the greatest straight-line distance from the
    /// start; the start itself when nothing is reachable.
    pub furthest: PortalId,
    /// Straight-line distance of `furthest` from the start, in meters.
    pub furthest_distance_m: f64,
}

/// Explore the graph from `start`, preferring short hops, and find the
/// furthest reachable portal.
///
/// Deque-driven traversal: candidate edges are classified, unreachable ones
/// skipped; a short hop pushes the neighbor to the front of the queue, a
/// long hop to the back, so free movement is expanded before key-consuming
/// movement. A neighbor's recorded predecessor may be rewritten by a later
/// discovery until the neighbor itself is expanded. This is a deliberately
/// biased heuristic structure, not a shortest-path tree: its job is to find
/// a good far target for the main path search and to give the renderer a
/// tree of everything reachable.
pub fn build_spanning_tree(model: &HopModel<'_>, start: &PortalId) -> SpanningTree {
    let mut parents: HashMap<PortalId, Option<PortalId>> = HashMap::new();
    let mut furthest = start.clone();
    let mut furthest_distance_m = 0.0;

    let Some(start_portal) = model.graph().portal(start) else {
        return SpanningTree {
            parents,
            furthest,
            furthest_distance_m,
        };
    };
    let start_pos = start_portal.pos;

    parents.insert(start.clone(), None);
    let mut visited: HashSet<PortalId> = HashSet::new();
    let mut queue: VecDeque<PortalId> = VecDeque::new();
    queue.push_back(start.clone());

    while let Some(id) = queue.pop_front() {
        if !visited.insert(id.clone()) {
            continue;
        }

        if let Some(portal) = model.graph().portal(&id) {
            let d = haversine_m(start_pos, portal.pos);
            if d > furthest_distance_m {
                furthest_distance_m = d;
                furthest = id.clone();
            }
        }

        for neighbor in model.neighbors(&id) {
            if visited.contains(neighbor) {
                continue;
            }
            let info = model.classify(&id, neighbor);
            if !info.reachable() {
                continue;
            }
            parents.insert(neighbor.clone(), Some(id.clone()));
            if info.short {
                queue.push_front(neighbor.clone());
            } else {
                queue.push_back(neighbor.clone());
            }
        }
    }

    // Nothing reachable beyond the start: report an empty tree.
    if parents.len() == 1 {
        parents.clear();
    }

    SpanningTree {
        parents,
        furthest,
        furthest_distance_m,
    }
}
