//! The [`Planner`]: one instance owning settings, graph, caches and the
//! run-token source.

use std::collections::HashMap;
use std::time::Duration;

use skimmer_core::{LatLngBounds, Portal, PortalId};
use skimmer_paths::{
    HopModel, LinkGraph, ReachCache, SearchStep, Settings, SlicedAstar, TokenSource, astar_path,
    build_spanning_tree,
};

/// Fewest portals a planning run needs; anything less yields an empty plan.
pub const MIN_PLAN_PORTALS: usize = 2;

/// A finished planning run: the reachability tree and the route to the
/// furthest point.
///
/// Replaced wholesale on every re-plan, never partially mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    /// Predecessor per reached portal (`None` for the start). Consumed by
    /// the tree overlay renderer.
    pub tree: HashMap<PortalId, Option<PortalId>>,
    /// The route from the start to the furthest reachable portal.
    pub path: Vec<PortalId>,
}

impl Plan {
    /// The placeholder "no plan" result.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether this is the placeholder result.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty() && self.path.is_empty()
    }
}

/// Outcome of [`Planner::begin_plan`].
pub enum PlanRun {
    /// The run finished immediately (usually the "no plan" placeholder).
    Ready(Plan),
    /// A search is in flight; drive it with [`PendingPlan::step`].
    Pending(PendingPlan),
}

/// Outcome of one [`PendingPlan::step`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanStep {
    /// Budget exhausted; step again on the next idle opportunity.
    InProgress,
    /// A newer plan was started; this run is abandoned.
    Cancelled,
    /// The plan is complete.
    Done(Plan),
}

/// An in-flight time-sliced planning run.
///
/// The spanning tree is already built; the A* phase advances one bounded
/// slice per [`step`](PendingPlan::step) call. Starting any new plan on the
/// owning planner cancels this run implicitly.
pub struct PendingPlan {
    tree: HashMap<PortalId, Option<PortalId>>,
    search: SlicedAstar,
}

impl PendingPlan {
    /// Advance the search by at most `budget`.
    pub fn step(&mut self, planner: &Planner, budget: Duration) -> PlanStep {
        match self.search.step(&planner.model(), budget) {
            SearchStep::InProgress => PlanStep::InProgress,
            SearchStep::Cancelled => PlanStep::Cancelled,
            SearchStep::Done(path) => PlanStep::Done(Plan {
                tree: std::mem::take(&mut self.tree),
                path,
            }),
        }
    }
}

/// Drone flight planner over a working portal set.
///
/// Construct one per map view; there is no shared global instance. Feed it
/// portals via [`add_portal`](Planner::add_portal), then run
/// [`plan`](Planner::plan) (synchronous) or
/// [`begin_plan`](Planner::begin_plan) (time-sliced).
pub struct Planner {
    settings: Settings,
    graph: LinkGraph,
    reach: ReachCache,
    tokens: TokenSource,
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Planner {
    /// Create a planner with the given settings (sanitized on the way in).
    pub fn new(mut settings: Settings) -> Self {
        settings.sanitize();
        Self {
            settings,
            graph: LinkGraph::new(),
            reach: ReachCache::new(),
            tokens: TokenSource::new(),
        }
    }

    /// The active settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Install new settings, invalidating cached reachability results when
    /// any value feeding them changed.
    pub fn set_settings(&mut self, mut settings: Settings) {
        settings.sanitize();
        if self.settings.reachability_changed(&settings) {
            self.reach.clear();
        }
        self.settings = settings;
    }

    /// The working graph.
    pub fn graph(&self) -> &LinkGraph {
        &self.graph
    }

    /// Feed one visible portal into the working set. Returns whether the
    /// portal was added.
    pub fn add_portal(&mut self, portal: Portal, bounds: &LatLngBounds) -> bool {
        self.graph.add_portal(portal, bounds)
    }

    /// Drop the working set and all caches.
    pub fn clear_portals(&mut self) {
        self.graph.clear();
        self.reach.clear();
    }

    /// Run a full synchronous plan from `start`.
    ///
    /// Cancels any in-flight time-sliced run. A missing start portal or a
    /// working set below [`MIN_PLAN_PORTALS`] yields the empty placeholder
    /// plan rather than an error.
    pub fn plan(&mut self, start: &PortalId) -> Plan {
        let _token = self.tokens.issue();
        self.reach.clear();

        if !self.can_plan(start) {
            log::debug!("no plan: start {start} missing or too few portals");
            return Plan::empty();
        }

        let model = self.model();
        let tree = build_spanning_tree(&model, start);
        let path = astar_path(&model, start, &tree.furthest);
        log::debug!(
            "planned route to {}: {} steps, furthest {:.0} m out",
            tree.furthest,
            path.len().saturating_sub(1),
            tree.furthest_distance_m
        );
        Plan {
            tree: tree.parents,
            path,
        }
    }

    /// Start a time-sliced plan from `start`.
    ///
    /// The spanning tree is built synchronously; the A* phase — where the
    /// search cost concentrates — is returned as a [`PendingPlan`] to be
    /// driven in bounded slices. Implicitly cancels any earlier pending run.
    pub fn begin_plan(&mut self, start: &PortalId) -> PlanRun {
        let token = self.tokens.issue();
        self.reach.clear();

        if !self.can_plan(start) {
            log::debug!("no plan: start {start} missing or too few portals");
            return PlanRun::Ready(Plan::empty());
        }

        let model = self.model();
        let tree = build_spanning_tree(&model, start);
        let search = SlicedAstar::new(&model, start, &tree.furthest, token);
        PlanRun::Pending(PendingPlan {
            tree: tree.parents,
            search,
        })
    }

    fn can_plan(&self, start: &PortalId) -> bool {
        self.graph.contains(start) && self.graph.len() >= MIN_PLAN_PORTALS
    }

    fn model(&self) -> HopModel<'_> {
        HopModel::new(&self.graph, &self.settings, &self.reach)
    }
}
