//! **skimmer-plan** — Planner facade for drone flight routes.
//!
//! Ties the engine crates together behind a single [`Planner`] owning the
//! settings, the proximity graph, the reachability cache and the run-token
//! source. Adds the persistence boundary: tolerant settings loading,
//! plan-file JSON import/export, and the human-readable route report.

pub mod export;
pub mod planner;
pub mod settings;

pub use export::{PLAN_FILE_VERSION, PlanFile, PortalRecord, load_plan_file, render_route_text};
pub use planner::{MIN_PLAN_PORTALS, PendingPlan, Plan, PlanRun, PlanStep, Planner};
pub use settings::{settings_from_json, settings_to_json};

pub use skimmer_paths::{OptMode, PathMode, Settings};
