//! Reachability engine: which grid cells a drone can see from a point.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use skimmer_core::{CellId, LatLng, Portal, PortalId, haversine_m};

/// Memoized reachable-cell sets, plus a per-portal cell-id memo.
///
/// Results are keyed by (origin cell, radius); repeated queries with
/// unchanged settings return the same `Rc`. The owner must [`clear`] the
/// cache whenever a setting affecting reachability changes and at the start
/// of every top-level plan, since stale entries are indistinguishable from
/// fresh ones.
///
/// [`clear`]: ReachCache::clear
#[derive(Debug, Default)]
pub struct ReachCache {
    sets: RefCell<HashMap<(CellId, u64), Rc<HashSet<CellId>>>>,
    portal_cells: RefCell<HashMap<PortalId, CellId>>,
}

impl ReachCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all memoized entries.
    pub fn clear(&self) {
        self.sets.borrow_mut().clear();
        self.portal_cells.borrow_mut().clear();
    }

    /// The grid cell containing `portal` at `level`, memoized by portal id.
    ///
    /// The memo assumes a fixed level between [`clear`](ReachCache::clear)
    /// calls; the owner clears on level changes.
    pub fn cell_of(&self, portal: &Portal, level: u8) -> CellId {
        if let Some(cell) = self.portal_cells.borrow().get(&portal.id) {
            return *cell;
        }
        let cell = CellId::from_latlng(portal.pos, level);
        self.portal_cells
            .borrow_mut()
            .insert(portal.id.clone(), cell);
        cell
    }

    /// The set of cells whose area intersects a circle of `radius_m` around
    /// `origin`, memoized by (origin cell, radius).
    ///
    /// Breadth-first expansion from the origin cell. A cell counts as in
    /// range when the great-circle distance from `origin` to its center, any
    /// corner, or any edge midpoint is below `radius_m` — a conservative
    /// circle rasterization that samples enough points to avoid false
    /// negatives when cells are large relative to the radius. The origin
    /// cell is always part of the result.
    pub fn cells_within(&self, origin: LatLng, level: u8, radius_m: f64) -> Rc<HashSet<CellId>> {
        let origin_cell = CellId::from_latlng(origin, level);
        let key = (origin_cell, radius_m.to_bits());
        if let Some(set) = self.sets.borrow().get(&key) {
            return Rc::clone(set);
        }
        let set = Rc::new(expand_in_range(origin, origin_cell, radius_m));
        self.sets.borrow_mut().insert(key, Rc::clone(&set));
        set
    }
}

fn expand_in_range(origin: LatLng, origin_cell: CellId, radius_m: f64) -> HashSet<CellId> {
    let mut in_range = HashSet::new();
    in_range.insert(origin_cell);

    let mut seen = HashSet::new();
    seen.insert(origin_cell);
    let mut frontier = VecDeque::new();
    frontier.push_back(origin_cell);

    while let Some(cell) = frontier.pop_front() {
        for neighbor in cell.neighbors() {
            if !seen.insert(neighbor) {
                continue;
            }
            if cell_in_range(origin, neighbor, radius_m) {
                in_range.insert(neighbor);
                frontier.push_back(neighbor);
            }
        }
    }
    in_range
}

fn cell_in_range(origin: LatLng, cell: CellId, radius_m: f64) -> bool {
    if haversine_m(origin, cell.center()) < radius_m {
        return true;
    }
    let corners = cell.corners();
    for k in 0..4 {
        if haversine_m(origin, corners[k]) < radius_m {
            return true;
        }
        let mid = LatLng::midpoint(corners[k], corners[(k + 1) % 4]);
        if haversine_m(origin, mid) < radius_m {
            return true;
        }
    }
    false
}
