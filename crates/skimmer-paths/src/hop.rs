//! Hop classification and the traversal cost model.

use skimmer_core::{PortalId, haversine_m};

use crate::graph::{LinkGraph, MAX_LINK_DISTANCE_M};
use crate::reach::ReachCache;
use crate::settings::{PathMode, Settings};

/// Classification of one ordered portal pair under the current settings.
///
/// Derived on demand, never stored. `short` and `long` are mutually
/// exclusive; a hop with neither is unreachable.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HopInfo {
    /// Great-circle distance between the pair in meters.
    pub distance_m: f64,
    /// Free hop within view range.
    pub short: bool,
    /// Key-consuming hop within the hard link maximum.
    pub long: bool,
}

impl HopInfo {
    /// Whether the hop can be flown at all.
    #[inline]
    pub fn reachable(&self) -> bool {
        self.short || self.long
    }

    fn unreachable(distance_m: f64) -> Self {
        Self {
            distance_m,
            short: false,
            long: false,
        }
    }
}

/// Edge classifier and cost model over a [`LinkGraph`].
///
/// A cheap per-run view borrowing the graph, the settings and the
/// reachability cache. All searches consult it for neighbor enumeration,
/// classification, costs and heuristic estimates.
pub struct HopModel<'a> {
    graph: &'a LinkGraph,
    settings: &'a Settings,
    reach: &'a ReachCache,
}

impl<'a> HopModel<'a> {
    /// Create a model over the given graph, settings and cache.
    pub fn new(graph: &'a LinkGraph, settings: &'a Settings, reach: &'a ReachCache) -> Self {
        Self {
            graph,
            settings,
            reach,
        }
    }

    /// The underlying graph.
    #[inline]
    pub fn graph(&self) -> &LinkGraph {
        self.graph
    }

    /// The active settings.
    #[inline]
    pub fn settings(&self) -> &Settings {
        self.settings
    }

    /// Neighbor ids of `id` in the graph.
    #[inline]
    pub fn neighbors(&self, id: &PortalId) -> &[PortalId] {
        self.graph.neighbors(id)
    }

    /// Classify the ordered hop `from` → `to`.
    ///
    /// Reachability is directional: the reachable-cell set is computed from
    /// the origin's cell, so `classify(a, b)` need not equal
    /// `classify(b, a)` in grid mode.
    pub fn classify(&self, from: &PortalId, to: &PortalId) -> HopInfo {
        let (Some(a), Some(b)) = (self.graph.portal(from), self.graph.portal(to)) else {
            return HopInfo::unreachable(f64::INFINITY);
        };
        let distance_m = haversine_m(a.pos, b.pos);

        let short = if self.settings.use_s2 {
            let visible = self.reach.cells_within(
                a.pos,
                self.settings.s2_level,
                self.settings.view_radius_m,
            );
            visible.contains(&self.reach.cell_of(b, self.settings.s2_level))
        } else {
            distance_m <= self.settings.view_radius_m
        };

        let long = !short && self.settings.allow_long_hops && distance_m <= MAX_LINK_DISTANCE_M;

        HopInfo {
            distance_m,
            short,
            long,
        }
    }

    /// Traversal cost of the ordered hop `from` → `to` under the active
    /// path mode. Unreachable hops cost infinity.
    pub fn cost(&self, from: &PortalId, to: &PortalId) -> f64 {
        let info = self.classify(from, to);
        if info.short {
            1.0
        } else if info.long {
            match self.settings.path_mode {
                PathMode::MinLongHops => 100.0,
                PathMode::MinHops => 1.01,
                PathMode::Balanced => 3.0,
            }
        } else {
            f64::INFINITY
        }
    }

    /// Heuristic estimate of the remaining cost from `from` to `to`.
    ///
    /// In grid mode, portals on the same cube face use the Chebyshev
    /// distance between their cell coordinates. Everything else falls back
    /// to a distance-derived hop estimate. Both are scaled by the
    /// optimization mode; scales above 1 over-estimate on purpose.
    pub fn estimate(&self, from: &PortalId, to: &PortalId) -> f64 {
        let (Some(a), Some(b)) = (self.graph.portal(from), self.graph.portal(to)) else {
            return 0.0;
        };
        let scale = self.settings.optimization.heuristic_scale();

        if self.settings.use_s2 {
            let ca = self.reach.cell_of(a, self.settings.s2_level);
            let cb = self.reach.cell_of(b, self.settings.s2_level);
            if ca.face == cb.face {
                let di = (i64::from(ca.i) - i64::from(cb.i)).abs();
                let dj = (i64::from(ca.j) - i64::from(cb.j)).abs();
                return di.max(dj) as f64 * scale;
            }
        }

        let d = haversine_m(a.pos, b.pos);
        let by_long_hops = (d / MAX_LINK_DISTANCE_M).ceil() * 1.01;
        let by_short_hops = (d / self.settings.view_radius_m).ceil();
        by_long_hops.min(by_short_hops) * scale
    }

    /// Whether the pair is reachable in exactly one direction.
    ///
    /// Grid-mode reachability is asymmetric; routes through such an edge
    /// cannot be flown back without a detour.
    pub fn is_one_way(&self, a: &PortalId, b: &PortalId) -> bool {
        self.classify(a, b).reachable() != self.classify(b, a).reachable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::OptMode;
    use skimmer_core::{LatLng, LatLngBounds, Portal};

    const BASE: LatLng = LatLng::new(52.52, 13.405);

    fn east(meters: f64) -> LatLng {
        let scale = 111_320.0 * BASE.lat.to_radians().cos();
        LatLng::new(BASE.lat, BASE.lng + meters / scale)
    }

    fn graph_with(portals: &[(&str, LatLng)]) -> LinkGraph {
        let mut g = LinkGraph::new();
        for (id, pos) in portals {
            g.add_portal(
                Portal::new(*id, id.to_uppercase(), pos.lat, pos.lng),
                &LatLngBounds::world(),
            );
        }
        g
    }

    fn plain_settings(view_radius_m: f64) -> Settings {
        Settings {
            use_s2: false,
            view_radius_m,
            ..Settings::default()
        }
    }

    #[test]
    fn plain_mode_short_within_view_radius() {
        let g = graph_with(&[("a", BASE), ("b", east(500.0))]);
        let settings = plain_settings(550.0);
        let reach = ReachCache::new();
        let model = HopModel::new(&g, &settings, &reach);

        let info = model.classify(&"a".into(), &"b".into());
        assert!(info.short);
        assert!(!info.long);
        assert!(info.reachable());
        assert!((info.distance_m - 500.0).abs() < 5.0);
    }

    #[test]
    fn plain_mode_long_beyond_view_radius() {
        let g = graph_with(&[("a", BASE), ("b", east(600.0))]);
        let settings = plain_settings(550.0);
        let reach = ReachCache::new();
        let model = HopModel::new(&g, &settings, &reach);

        let info = model.classify(&"a".into(), &"b".into());
        assert!(!info.short);
        assert!(info.long);
    }

    #[test]
    fn grid_mode_not_short_when_cells_out_of_range() {
        // 900 m apart: every sample point of the target's cell is well
        // beyond a 550 m radius at level 16.
        let g = graph_with(&[("a", BASE), ("b", east(900.0))]);
        let settings = Settings::default();
        let reach = ReachCache::new();
        let model = HopModel::new(&g, &settings, &reach);

        let info = model.classify(&"a".into(), &"b".into());
        assert!(!info.short);
        assert!(info.long);
    }

    #[test]
    fn grid_mode_short_for_close_pair() {
        let g = graph_with(&[("a", BASE), ("b", east(50.0))]);
        let settings = Settings::default();
        let reach = ReachCache::new();
        let model = HopModel::new(&g, &settings, &reach);

        assert!(model.classify(&"a".into(), &"b".into()).short);
    }

    #[test]
    fn unreachable_beyond_hard_max() {
        let g = graph_with(&[("a", BASE), ("b", east(1300.0))]);
        let settings = plain_settings(550.0);
        let reach = ReachCache::new();
        let model = HopModel::new(&g, &settings, &reach);

        let info = model.classify(&"a".into(), &"b".into());
        assert!(!info.reachable());
        assert_eq!(model.cost(&"a".into(), &"b".into()), f64::INFINITY);
    }

    #[test]
    fn long_hops_can_be_disallowed() {
        let g = graph_with(&[("a", BASE), ("b", east(700.0))]);
        let settings = Settings {
            allow_long_hops: false,
            ..plain_settings(550.0)
        };
        let reach = ReachCache::new();
        let model = HopModel::new(&g, &settings, &reach);

        assert!(!model.classify(&"a".into(), &"b".into()).reachable());
    }

    #[test]
    fn short_costs_less_than_long_in_every_path_mode() {
        let g = graph_with(&[("a", BASE), ("b", east(500.0)), ("c", east(1200.0))]);
        let reach = ReachCache::new();
        for mode in [PathMode::MinHops, PathMode::Balanced, PathMode::MinLongHops] {
            let settings = Settings {
                path_mode: mode,
                ..plain_settings(550.0)
            };
            let model = HopModel::new(&g, &settings, &reach);
            let short = model.cost(&"a".into(), &"b".into());
            let long = model.cost(&"b".into(), &"c".into());
            assert_eq!(short, 1.0);
            assert!(
                short < long && long.is_finite(),
                "{mode:?}: short {short} vs long {long}"
            );
        }
    }

    #[test]
    fn long_hop_cost_follows_path_mode() {
        let g = graph_with(&[("a", BASE), ("b", east(700.0))]);
        let reach = ReachCache::new();
        let cases = [
            (PathMode::MinHops, 1.01),
            (PathMode::Balanced, 3.0),
            (PathMode::MinLongHops, 100.0),
        ];
        for (mode, expected) in cases {
            let settings = Settings {
                path_mode: mode,
                ..plain_settings(550.0)
            };
            let model = HopModel::new(&g, &settings, &reach);
            assert_eq!(model.cost(&"a".into(), &"b".into()), expected);
        }
    }

    #[test]
    fn estimate_scales_with_optimization_mode() {
        let g = graph_with(&[("a", BASE), ("b", east(1000.0))]);
        let reach = ReachCache::new();
        let base = Settings {
            optimization: OptMode::None,
            ..plain_settings(550.0)
        };
        let mut greedy = base.clone();
        greedy.optimization = OptMode::Greedy;

        let e_base = HopModel::new(&g, &base, &reach).estimate(&"a".into(), &"b".into());
        let e_greedy = HopModel::new(&g, &greedy, &reach).estimate(&"a".into(), &"b".into());
        assert!((e_greedy - e_base * 10.0).abs() < 1e-9);
    }

    #[test]
    fn plain_estimate_uses_cheaper_of_both_hop_counts() {
        // 1000 m: one long hop (1 * 1.01) beats two view-radius hops (2).
        let g = graph_with(&[("a", BASE), ("b", east(1000.0))]);
        let settings = Settings {
            optimization: OptMode::None,
            ..plain_settings(550.0)
        };
        let reach = ReachCache::new();
        let model = HopModel::new(&g, &settings, &reach);
        let e = model.estimate(&"a".into(), &"b".into());
        assert!((e - 1.01).abs() < 1e-9, "estimate {e}");
    }

    #[test]
    fn grid_estimate_uses_chebyshev_cells_on_same_face() {
        let g = graph_with(&[("a", BASE), ("b", east(1000.0))]);
        let settings = Settings {
            optimization: OptMode::Perfect,
            ..Settings::default()
        };
        let reach = ReachCache::new();
        let model = HopModel::new(&g, &settings, &reach);

        let a = g.portal(&"a".into()).unwrap();
        let b = g.portal(&"b".into()).unwrap();
        let ca = reach.cell_of(a, settings.s2_level);
        let cb = reach.cell_of(b, settings.s2_level);
        assert_eq!(ca.face, cb.face);
        let expected = (i64::from(ca.i) - i64::from(cb.i))
            .abs()
            .max((i64::from(ca.j) - i64::from(cb.j)).abs()) as f64;
        assert_eq!(model.estimate(&"a".into(), &"b".into()), expected);
    }

    #[test]
    fn symmetric_in_plain_mode() {
        let g = graph_with(&[("a", BASE), ("b", east(600.0))]);
        let settings = plain_settings(550.0);
        let reach = ReachCache::new();
        let model = HopModel::new(&g, &settings, &reach);
        assert!(!model.is_one_way(&"a".into(), &"b".into()));
    }
}
