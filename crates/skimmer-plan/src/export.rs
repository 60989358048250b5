//! Plan-file import/export and the human-readable route report.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use skimmer_core::{Portal, PortalId};
use skimmer_paths::{HopModel, LinkGraph, ReachCache, Settings};

/// Current plan-file format version.
pub const PLAN_FILE_VERSION: &str = "1.0";

/// Portal entry in a persisted plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalRecord {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Persisted form of a plan, sufficient to re-run planning without the
/// original portal source.
///
/// `graph` is pruned to the path nodes but keeps their full neighbor lists;
/// `portals` covers every id appearing anywhere in `path` or `graph`, so the
/// stored graph is an induced subgraph over `portals`' keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFile {
    pub name: String,
    pub version: String,
    pub start_portal_guid: PortalId,
    pub path: Vec<PortalId>,
    pub graph: BTreeMap<PortalId, Vec<PortalId>>,
    pub portals: BTreeMap<PortalId, PortalRecord>,
}

impl PlanFile {
    /// Capture a plan for persistence, pruning the working graph down to
    /// the path nodes and their direct neighbors.
    pub fn from_plan(name: &str, start: &PortalId, path: &[PortalId], graph: &LinkGraph) -> Self {
        let mut pruned: BTreeMap<PortalId, Vec<PortalId>> = BTreeMap::new();
        let mut wanted: BTreeSet<PortalId> = path.iter().cloned().collect();
        wanted.insert(start.clone());

        for id in path {
            let neighbors = graph.neighbors(id).to_vec();
            wanted.extend(neighbors.iter().cloned());
            pruned.insert(id.clone(), neighbors);
        }

        let portals = wanted
            .into_iter()
            .filter_map(|id| {
                graph.portal(&id).map(|p| {
                    let record = PortalRecord {
                        name: p.name.clone(),
                        lat: p.pos.lat,
                        lng: p.pos.lng,
                    };
                    (id, record)
                })
            })
            .collect();

        PlanFile {
            name: name.to_owned(),
            version: PLAN_FILE_VERSION.to_owned(),
            start_portal_guid: start.clone(),
            path: path.to_vec(),
            graph: pruned,
            portals,
        }
    }

    /// Serialize to the JSON exchange format.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse the JSON exchange format.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Rebuild a working graph from the stored portals and adjacency.
    ///
    /// Edges are restored exactly as persisted rather than being re-derived
    /// from distances, so re-running planning sees the same graph the plan
    /// was made on.
    pub fn restore_graph(&self) -> LinkGraph {
        let mut graph = LinkGraph::new();
        for (id, record) in &self.portals {
            graph.insert_portal(Portal::new(
                id.clone(),
                record.name.clone(),
                record.lat,
                record.lng,
            ));
        }
        for (id, neighbors) in &self.graph {
            for neighbor in neighbors {
                graph.link(id, neighbor);
            }
        }
        graph
    }
}

/// Parse persisted plan data, discarding corrupt input.
///
/// Corrupt data is logged and dropped; the caller continues with no plan
/// rather than failing.
pub fn load_plan_file(raw: &str) -> Option<PlanFile> {
    match PlanFile::from_json_str(raw) {
        Ok(file) => Some(file),
        Err(err) => {
            log::warn!("discarding corrupt plan data: {err}");
            None
        }
    }
}

/// Render the plan as a human-readable step list.
///
/// Lists total hops, long hops and total distance, then one line per step
/// with the cumulative flight distance from the start. Hop classification
/// runs against the plan's own restored graph under `settings`.
pub fn render_route_text(file: &PlanFile, settings: &Settings) -> String {
    let graph = file.restore_graph();
    let reach = ReachCache::new();
    let model = HopModel::new(&graph, settings, &reach);

    let mut steps = Vec::with_capacity(file.path.len());
    let mut total_m = 0.0;
    let mut long_hops = 0usize;

    for (index, id) in file.path.iter().enumerate() {
        let name = file
            .portals
            .get(id)
            .map(|record| record.name.as_str())
            .unwrap_or("unknown portal");
        if index == 0 {
            steps.push(format!("0. Place drone at {name} (0.00 km)"));
            continue;
        }
        let info = model.classify(&file.path[index - 1], id);
        total_m += info.distance_m;
        let suffix = if info.long {
            long_hops += 1;
            " (Long hop: might need a key)"
        } else {
            ""
        };
        steps.push(format!(
            "{index}. Move drone to {name}{suffix} ({:.2} km)",
            total_m / 1000.0
        ));
    }

    let hops = file.path.len().saturating_sub(1);
    let mut out = format!(
        "Drone flight plan: {}\nHops: {hops} ({long_hops} long), total distance: {:.2} km\n\n",
        file.name,
        total_m / 1000.0
    );
    out.push_str(&steps.join("\n"));
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use skimmer_core::LatLng;

    const BASE: LatLng = LatLng::new(52.52, 13.405);

    fn east(meters: f64) -> LatLng {
        let scale = 111_320.0 * BASE.lat.to_radians().cos();
        LatLng::new(BASE.lat, BASE.lng + meters / scale)
    }

    /// The pruning scenario: path [a, b, c] in a graph where d and e hang
    /// off the path without being on it.
    fn sample_graph() -> LinkGraph {
        let mut g = LinkGraph::new();
        let spots = [
            ("a", east(0.0)),
            ("b", east(500.0)),
            ("c", east(1000.0)),
            ("d", east(-400.0)),
            ("e", east(1500.0)),
        ];
        for (id, pos) in spots {
            g.insert_portal(Portal::new(id, id.to_uppercase(), pos.lat, pos.lng));
        }
        g.link(&"a".into(), &"b".into());
        g.link(&"a".into(), &"d".into());
        g.link(&"b".into(), &"c".into());
        g.link(&"b".into(), &"e".into());
        g
    }

    fn ids(list: &[&str]) -> Vec<PortalId> {
        list.iter().map(|s| PortalId::from(*s)).collect()
    }

    #[test]
    fn pruning_keeps_path_nodes_and_their_neighbors() {
        let g = sample_graph();
        let path = ids(&["a", "b", "c"]);
        let file = PlanFile::from_plan("test run", &"a".into(), &path, &g);

        let graph_keys: Vec<&str> = file.graph.keys().map(|k| k.as_str()).collect();
        assert_eq!(graph_keys, ["a", "b", "c"]);
        assert_eq!(file.graph[&"a".into()].to_vec(), ids(&["b", "d"]));
        assert_eq!(file.graph[&"b".into()].to_vec(), ids(&["a", "c", "e"]));
        assert_eq!(file.graph[&"c".into()].to_vec(), ids(&["b"]));

        // d and e ride along because they neighbor path nodes.
        let portal_keys: Vec<&str> = file.portals.keys().map(|k| k.as_str()).collect();
        assert_eq!(portal_keys, ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn stored_graph_is_induced_over_portal_keys() {
        let g = sample_graph();
        let path = ids(&["a", "b", "c"]);
        let file = PlanFile::from_plan("test run", &"a".into(), &path, &g);

        for (id, neighbors) in &file.graph {
            assert!(file.portals.contains_key(id));
            for n in neighbors {
                assert!(file.portals.contains_key(n), "{n} missing from portals");
            }
        }
        for id in &file.path {
            assert!(file.portals.contains_key(id));
        }
    }

    #[test]
    fn json_round_trip_is_exact() {
        let g = sample_graph();
        let path = ids(&["a", "b", "c"]);
        let file = PlanFile::from_plan("test run", &"a".into(), &path, &g);

        let raw = file.to_json_string().unwrap();
        let back = PlanFile::from_json_str(&raw).unwrap();
        assert_eq!(back, file);
        assert_eq!(back.version, PLAN_FILE_VERSION);
        assert_eq!(back.start_portal_guid, PortalId::from("a"));
    }

    #[test]
    fn json_uses_camel_case_field_names() {
        let g = sample_graph();
        let file = PlanFile::from_plan("test run", &"a".into(), &ids(&["a", "b"]), &g);
        let raw = file.to_json_string().unwrap();
        assert!(raw.contains("\"startPortalGuid\""));
        assert!(raw.contains("\"portals\""));
        assert!(!raw.contains("start_portal_guid"));
    }

    #[test]
    fn corrupt_data_is_discarded() {
        assert!(load_plan_file("{not json").is_none());
        assert!(load_plan_file("{\"name\": \"x\"}").is_none()); // missing fields
        assert!(load_plan_file("[]").is_none());
    }

    #[test]
    fn restored_graph_supports_replanning() {
        let g = sample_graph();
        let path = ids(&["a", "b", "c"]);
        let file = PlanFile::from_plan("test run", &"a".into(), &path, &g);

        let restored = file.restore_graph();
        assert_eq!(restored.len(), 5);
        // Adjacency survives exactly for the path nodes.
        for id in &file.path {
            let mut expected = g.neighbors(id).to_vec();
            let mut actual = restored.neighbors(id).to_vec();
            expected.sort();
            actual.sort();
            assert_eq!(actual, expected, "adjacency of {id}");
        }
        assert!(restored.neighbors(&"d".into()).contains(&"a".into()));
    }

    #[test]
    fn report_lists_every_step_with_cumulative_distance() {
        let g = sample_graph();
        let path = ids(&["a", "b", "c"]);
        let file = PlanFile::from_plan("test run", &"a".into(), &path, &g);
        let settings = Settings {
            use_s2: false,
            view_radius_m: 550.0,
            ..Settings::default()
        };

        let report = render_route_text(&file, &settings);
        assert!(report.contains("Drone flight plan: test run"));
        assert!(report.contains("Hops: 2 (0 long)"));
        assert!(report.contains("0. Place drone at A (0.00 km)"));
        assert!(report.contains("1. Move drone to B (0.50 km)"));
        assert!(report.contains("2. Move drone to C (1.00 km)"));
        assert!(!report.contains("Long hop"));
    }

    #[test]
    fn report_flags_long_hops() {
        let mut g = LinkGraph::new();
        for (id, pos) in [("a", east(0.0)), ("b", east(700.0))] {
            g.insert_portal(Portal::new(id, id.to_uppercase(), pos.lat, pos.lng));
        }
        g.link(&"a".into(), &"b".into());
        let file = PlanFile::from_plan("keys needed", &"a".into(), &ids(&["a", "b"]), &g);
        let settings = Settings {
            use_s2: false,
            view_radius_m: 550.0,
            ..Settings::default()
        };

        let report = render_route_text(&file, &settings);
        assert!(report.contains("Hops: 1 (1 long)"));
        assert!(
            report.contains("1. Move drone to B (Long hop: might need a key) (0.70 km)"),
            "report was:\n{report}"
        );
    }
}
