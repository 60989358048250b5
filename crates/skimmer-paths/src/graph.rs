//! The proximity graph over portals.

use std::collections::HashMap;

use skimmer_core::{LatLngBounds, Portal, PortalId, haversine_m};

/// Hard maximum link distance in meters. Pairs farther apart than this are
/// never connected, regardless of settings.
pub const MAX_LINK_DISTANCE_M: f64 = 1250.0;

/// Undirected proximity graph: every pair of stored portals within
/// [`MAX_LINK_DISTANCE_M`] is connected.
///
/// The graph owns the working portal set. Adjacency lists are kept free of
/// self-loops and duplicates at insert time.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    portals: HashMap<PortalId, Portal>,
    adjacency: HashMap<PortalId, Vec<PortalId>>,
}

impl LinkGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a portal and link it against every stored portal in range.
    ///
    /// Returns `false` without modifying the graph when the portal falls
    /// outside `bounds` or is already present. Each incremental insert is
    /// O(n) distance checks; building a graph of n portals is O(n²), which
    /// is acceptable for viewport-sized sets.
    pub fn add_portal(&mut self, portal: Portal, bounds: &LatLngBounds) -> bool {
        if !bounds.contains(portal.pos) {
            return false;
        }
        if self.portals.contains_key(&portal.id) {
            return false;
        }

        let in_range: Vec<PortalId> = self
            .portals
            .values()
            .filter(|other| haversine_m(other.pos, portal.pos) <= MAX_LINK_DISTANCE_M)
            .map(|other| other.id.clone())
            .collect();

        let id = portal.id.clone();
        self.portals.insert(id.clone(), portal);
        self.adjacency.entry(id.clone()).or_default();
        for other in &in_range {
            self.link(&id, other);
        }
        true
    }

    /// Insert a portal without computing any links.
    ///
    /// Used when reconstructing a graph from a persisted plan, where the
    /// adjacency is restored explicitly via [`LinkGraph::link`]. A no-op if
    /// the id is already present.
    pub fn insert_portal(&mut self, portal: Portal) {
        if self.portals.contains_key(&portal.id) {
            return;
        }
        let id = portal.id.clone();
        self.portals.insert(id.clone(), portal);
        self.adjacency.entry(id).or_default();
    }

    /// Add an undirected edge. Self-loops are ignored; repeated links do not
    /// produce duplicate adjacency entries.
    pub fn link(&mut self, a: &PortalId, b: &PortalId) {
        if a == b {
            return;
        }
        push_unique(self.adjacency.entry(a.clone()).or_default(), b);
        push_unique(self.adjacency.entry(b.clone()).or_default(), a);
    }

    /// Neighbor ids of `id`, in insertion order. Empty for unknown ids.
    pub fn neighbors(&self, id: &PortalId) -> &[PortalId] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Look up a portal by id.
    pub fn portal(&self, id: &PortalId) -> Option<&Portal> {
        self.portals.get(id)
    }

    /// Whether `id` is in the working set.
    pub fn contains(&self, id: &PortalId) -> bool {
        self.portals.contains_key(id)
    }

    /// Number of portals in the working set.
    pub fn len(&self) -> usize {
        self.portals.len()
    }

    /// Whether the working set is empty.
    pub fn is_empty(&self) -> bool {
        self.portals.is_empty()
    }

    /// Iterator over all portal ids.
    pub fn portal_ids(&self) -> impl Iterator<Item = &PortalId> {
        self.portals.keys()
    }

    /// Iterator over all portals.
    pub fn portals(&self) -> impl Iterator<Item = &Portal> {
        self.portals.values()
    }

    /// Drop all portals and edges.
    pub fn clear(&mut self) {
        self.portals.clear();
        self.adjacency.clear();
    }
}

fn push_unique(list: &mut Vec<PortalId>, id: &PortalId) {
    if !list.contains(id) {
        list.push(id.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skimmer_core::LatLng;

    // Degrees of longitude per meter at the test latitude.
    fn east(base: LatLng, meters: f64) -> LatLng {
        let scale = 111_320.0 * base.lat.to_radians().cos();
        LatLng::new(base.lat, base.lng + meters / scale)
    }

    fn portal(id: &str, pos: LatLng) -> Portal {
        Portal::new(id, id.to_uppercase(), pos.lat, pos.lng)
    }

    const BASE: LatLng = LatLng::new(52.52, 13.405);

    #[test]
    fn links_pairs_within_range() {
        let mut g = LinkGraph::new();
        let bounds = LatLngBounds::world();
        g.add_portal(portal("a", BASE), &bounds);
        g.add_portal(portal("b", east(BASE, 1000.0)), &bounds);
        g.add_portal(portal("c", east(BASE, 2600.0)), &bounds);

        // a-b is 1000 m, b-c is 1600 m, a-c is 2600 m: only a-b links.
        assert_eq!(g.neighbors(&"a".into()).to_vec(), vec![PortalId::from("b")]);
        assert_eq!(g.neighbors(&"b".into()).to_vec(), vec![PortalId::from("a")]);
        assert!(g.neighbors(&"c".into()).is_empty());
    }

    #[test]
    fn does_not_link_beyond_hard_max() {
        let mut g = LinkGraph::new();
        let bounds = LatLngBounds::world();
        g.add_portal(portal("a", BASE), &bounds);
        g.add_portal(portal("b", east(BASE, 1300.0)), &bounds);
        assert!(g.neighbors(&"a".into()).is_empty());
        assert!(g.neighbors(&"b".into()).is_empty());
    }

    #[test]
    fn edges_are_symmetric() {
        let mut g = LinkGraph::new();
        let bounds = LatLngBounds::world();
        for k in 0..6 {
            g.add_portal(portal(&format!("p{k}"), east(BASE, k as f64 * 400.0)), &bounds);
        }
        for id in g.portal_ids() {
            for n in g.neighbors(id) {
                assert!(
                    g.neighbors(n).contains(id),
                    "edge {id}->{n} has no reverse"
                );
            }
        }
    }

    #[test]
    fn edges_symmetric_on_random_cloud() {
        use rand::RngExt;

        let mut rng = rand::rng();
        let mut g = LinkGraph::new();
        let bounds = LatLngBounds::world();
        for k in 0..60 {
            let pos = LatLng::new(
                52.52 + rng.random_range(0.0..0.02),
                13.40 + rng.random_range(0.0..0.03),
            );
            g.add_portal(portal(&format!("p{k}"), pos), &bounds);
        }
        for id in g.portal_ids() {
            assert!(!g.neighbors(id).contains(id), "self-loop on {id}");
            for n in g.neighbors(id) {
                assert!(g.neighbors(n).contains(id));
            }
        }
    }

    #[test]
    fn re_adding_is_a_no_op() {
        let mut g = LinkGraph::new();
        let bounds = LatLngBounds::world();
        assert!(g.add_portal(portal("a", BASE), &bounds));
        assert!(g.add_portal(portal("b", east(BASE, 500.0)), &bounds));
        assert!(!g.add_portal(portal("a", BASE), &bounds));

        assert_eq!(g.len(), 2);
        assert_eq!(g.neighbors(&"a".into()).len(), 1);
        assert_eq!(g.neighbors(&"b".into()).len(), 1);
    }

    #[test]
    fn bounds_filter_excludes_outside_portals() {
        let mut g = LinkGraph::new();
        let bounds = LatLngBounds::new(52.0, 13.0, 53.0, 14.0);
        assert!(!g.add_portal(portal("far", LatLng::new(48.85, 2.35)), &bounds));
        assert!(g.is_empty());
    }

    #[test]
    fn repeated_link_does_not_duplicate() {
        let mut g = LinkGraph::new();
        g.insert_portal(portal("a", BASE));
        g.insert_portal(portal("b", east(BASE, 500.0)));
        g.link(&"a".into(), &"b".into());
        g.link(&"a".into(), &"b".into());
        g.link(&"b".into(), &"a".into());
        assert_eq!(g.neighbors(&"a".into()).len(), 1);
        assert_eq!(g.neighbors(&"b".into()).len(), 1);
    }

    #[test]
    fn link_ignores_self_loop() {
        let mut g = LinkGraph::new();
        g.insert_portal(portal("a", BASE));
        g.link(&"a".into(), &"a".into());
        assert!(g.neighbors(&"a".into()).is_empty());
    }
}
