//! **skimmer-core** — Geographic core types for the skimmer drone-flight
//! planner.
//!
//! This crate provides the foundational types used across the *skimmer*
//! workspace: latitude/longitude coordinates with great-circle distance,
//! viewport bounds, portal records, and the hierarchical spherical grid
//! index ([`CellId`]) used for reachability tests.

pub mod cell;
pub mod geo;
pub mod portal;

pub use cell::{CellId, ParseCellIdError};
pub use geo::{EARTH_RADIUS_M, LatLng, LatLngBounds, haversine_m};
pub use portal::{Portal, PortalId};
