//! Graph construction and search engine for drone flight planning.
//!
//! This crate turns a set of portals into a proximity graph and searches it
//! for long, low-cost drone routes:
//!
//! - **Proximity graph** over portals within link range ([`LinkGraph`])
//! - **Reachability engine**: which grid cells a drone can see from a point
//!   ([`ReachCache`])
//! - **Hop classification and costs** under the current tuning
//!   ([`HopModel`])
//! - **Spanning-tree + furthest-point search**
//!   ([`build_spanning_tree`])
//! - **A\***, synchronous ([`astar_path`]) and time-sliced with run-token
//!   cancellation ([`SlicedAstar`])
//!
//! All searches take a [`HopModel`], a lightweight view borrowing the graph,
//! the [`Settings`] and the [`ReachCache`], which keeps edge classification
//! in one place.

mod astar;
mod graph;
mod hop;
mod reach;
mod settings;
mod sliced;
mod spanning;

pub use astar::{MAX_PATH_LEN, UNREACHABLE, astar_path};
pub use graph::{LinkGraph, MAX_LINK_DISTANCE_M};
pub use hop::{HopInfo, HopModel};
pub use reach::ReachCache;
pub use settings::{ALLOWED_S2_LEVELS, OptMode, PathMode, Settings};
pub use sliced::{DEFAULT_SLICE_BUDGET, RunToken, SearchStep, SlicedAstar, TokenSource};
pub use spanning::{SpanningTree, build_spanning_tree};
