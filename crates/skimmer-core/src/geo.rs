//! Geographic primitives: [`LatLng`], [`LatLngBounds`] and great-circle
//! distance.

use std::fmt;

/// Mean Earth radius in meters, used for all great-circle computations.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

// ---------------------------------------------------------------------------
// LatLng
// ---------------------------------------------------------------------------

/// A geographic coordinate in degrees (WGS84-like planar approximation).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Create a new coordinate.
    #[inline]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Coordinate-wise midpoint of two positions.
    ///
    /// A planar approximation, adequate for the sub-kilometer spans this
    /// library works with. Not valid across the antimeridian.
    #[inline]
    pub fn midpoint(a: LatLng, b: LatLng) -> LatLng {
        LatLng::new((a.lat + b.lat) / 2.0, (a.lng + b.lng) / 2.0)
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// Great-circle distance between two coordinates in meters, using the
/// haversine formula.
pub fn haversine_m(a: LatLng, b: LatLng) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

// ---------------------------------------------------------------------------
// LatLngBounds
// ---------------------------------------------------------------------------

/// An axis-aligned geographic rectangle, inclusive on all edges.
///
/// Used as the viewport filter when feeding portals into the graph builder.
/// Does not handle spans crossing the antimeridian.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatLngBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl LatLngBounds {
    /// Create bounds from the south-west and north-east edges.
    #[inline]
    pub const fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// Bounds covering the whole globe.
    #[inline]
    pub const fn world() -> Self {
        Self::new(-90.0, -180.0, 90.0, 180.0)
    }

    /// Whether `pos` lies inside the bounds.
    #[inline]
    pub fn contains(&self, pos: LatLng) -> bool {
        pos.lat >= self.south && pos.lat <= self.north && pos.lng >= self.west && pos.lng <= self.east
    }
}
