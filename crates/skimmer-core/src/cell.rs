//! Hierarchical spherical grid index.
//!
//! Maps a geographic coordinate to a quadrilateral cell on one of six cube
//! faces projected onto the sphere, at a given subdivision level. Supports
//! 4-connected neighbor enumeration (wrapping across face edges), corner and
//! center reconstruction, and a canonical string token that round-trips.
//!
//! The projection applies a quadratic warp between face coordinates and grid
//! coordinates so that cells at the same level have more uniform area across
//! a face. Comparing cells of different face or level is undefined; callers
//! must not do it.

use std::fmt;
use std::str::FromStr;

use crate::geo::LatLng;

/// A grid cell: cube face, (i, j) grid coordinates and subdivision level.
///
/// Derived deterministically from a [`LatLng`] + level via
/// [`CellId::from_latlng`]; never constructed independently.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellId {
    pub face: u8,
    pub i: u32,
    pub j: u32,
    pub level: u8,
}

impl CellId {
    /// The cell containing `pos` at the given subdivision level.
    pub fn from_latlng(pos: LatLng, level: u8) -> CellId {
        debug_assert!(level <= 30, "level out of range");
        let p = latlng_to_xyz(pos);
        let face = face_of(p);
        let (u, v) = face_uv(face, p);
        CellId {
            face,
            i: st_to_ij(uv_to_st(u), level),
            j: st_to_ij(uv_to_st(v), level),
            level,
        }
    }

    /// The four edge-adjacent neighbors, in (i-1, j-1, i+1, j+1) order.
    ///
    /// Neighbors across a cube-face edge are resolved by re-projecting
    /// through 3D space; diagonal (corner) adjacency is never produced.
    pub fn neighbors(self) -> [CellId; 4] {
        let i = self.i as i64;
        let j = self.j as i64;
        [
            self.from_ij_wrap(i - 1, j),
            self.from_ij_wrap(i, j - 1),
            self.from_ij_wrap(i + 1, j),
            self.from_ij_wrap(i, j + 1),
        ]
    }

    /// The cell's center coordinate.
    #[inline]
    pub fn center(self) -> LatLng {
        self.point_at(0.5, 0.5)
    }

    /// The cell's four corner coordinates, in counter-clockwise grid order.
    pub fn corners(self) -> [LatLng; 4] {
        [
            self.point_at(0.0, 0.0),
            self.point_at(1.0, 0.0),
            self.point_at(1.0, 1.0),
            self.point_at(0.0, 1.0),
        ]
    }

    /// Resolve the cell at raw grid coordinates, which may lie one step
    /// outside the face.
    ///
    /// Out-of-bounds coordinates are only ever one step past an edge here,
    /// so the would-be cell center projects to a point just beyond the cube
    /// face; re-deriving the cell from that point lands on the adjacent face.
    fn from_ij_wrap(self, i: i64, j: i64) -> CellId {
        let max = 1i64 << self.level;
        if i >= 0 && j >= 0 && i < max && j < max {
            return CellId {
                face: self.face,
                i: i as u32,
                j: j as u32,
                level: self.level,
            };
        }
        let u = st_to_uv(ij_to_st(i, self.level, 0.5));
        let v = st_to_uv(ij_to_st(j, self.level, 0.5));
        let pos = xyz_to_latlng(face_uv_to_xyz(self.face, u, v));
        CellId::from_latlng(pos, self.level)
    }

    /// Coordinate at fractional offsets (`di`, `dj`) within the cell, where
    /// (0, 0) is one corner and (1, 1) the opposite one.
    fn point_at(self, di: f64, dj: f64) -> LatLng {
        let u = st_to_uv(ij_to_st(self.i as i64, self.level, di));
        let v = st_to_uv(ij_to_st(self.j as i64, self.level, dj));
        xyz_to_latlng(face_uv_to_xyz(self.face, u, v))
    }
}

// ---------------------------------------------------------------------------
// Canonical token
// ---------------------------------------------------------------------------

impl fmt::Display for CellId {
    /// Canonical token: `F{face}ij[{i},{j}]@{level}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}ij[{},{}]@{}", self.face, self.i, self.j, self.level)
    }
}

/// Error parsing a [`CellId`] token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCellIdError;

impl fmt::Display for ParseCellIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid cell id token")
    }
}

impl std::error::Error for ParseCellIdError {}

impl FromStr for CellId {
    type Err = ParseCellIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix('F').ok_or(ParseCellIdError)?;
        let (face, rest) = rest.split_once("ij[").ok_or(ParseCellIdError)?;
        let (i, rest) = rest.split_once(',').ok_or(ParseCellIdError)?;
        let (j, rest) = rest.split_once(']').ok_or(ParseCellIdError)?;
        let level = rest.strip_prefix('@').ok_or(ParseCellIdError)?;

        let face: u8 = face.parse().map_err(|_| ParseCellIdError)?;
        let i: u32 = i.parse().map_err(|_| ParseCellIdError)?;
        let j: u32 = j.parse().map_err(|_| ParseCellIdError)?;
        let level: u8 = level.parse().map_err(|_| ParseCellIdError)?;

        if face > 5 || level > 30 {
            return Err(ParseCellIdError);
        }
        let max = 1u64 << level;
        if u64::from(i) >= max || u64::from(j) >= max {
            return Err(ParseCellIdError);
        }
        Ok(CellId { face, i, j, level })
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

fn latlng_to_xyz(pos: LatLng) -> [f64; 3] {
    let lat = pos.lat.to_radians();
    let lng = pos.lng.to_radians();
    [lat.cos() * lng.cos(), lat.cos() * lng.sin(), lat.sin()]
}

fn xyz_to_latlng(p: [f64; 3]) -> LatLng {
    let lat = p[2].atan2((p[0] * p[0] + p[1] * p[1]).sqrt());
    let lng = p[1].atan2(p[0]);
    LatLng::new(lat.to_degrees(), lng.to_degrees())
}

/// Cube face of a direction vector: the axis with the largest-magnitude
/// component, offset by 3 for the negative sign.
fn face_of(p: [f64; 3]) -> u8 {
    let abs = [p[0].abs(), p[1].abs(), p[2].abs()];
    let axis = if abs[0] > abs[1] {
        if abs[0] > abs[2] { 0 } else { 2 }
    } else if abs[1] > abs[2] {
        1
    } else {
        2
    };
    if p[axis] > 0.0 { axis as u8 } else { axis as u8 + 3 }
}

/// Project a direction vector onto a face's (u, v) plane.
fn face_uv(face: u8, p: [f64; 3]) -> (f64, f64) {
    let [x, y, z] = p;
    match face {
        0 => (y / x, z / x),
        1 => (-x / y, z / y),
        2 => (-x / z, -y / z),
        3 => (z / x, y / x),
        4 => (z / y, -x / y),
        5 => (-y / z, -x / z),
        _ => unreachable!("face index out of range"),
    }
}

/// Inverse of [`face_uv`]: the (unnormalized) direction vector for face
/// coordinates (u, v).
fn face_uv_to_xyz(face: u8, u: f64, v: f64) -> [f64; 3] {
    match face {
        0 => [1.0, u, v],
        1 => [-u, 1.0, v],
        2 => [-u, -v, 1.0],
        3 => [-1.0, -v, -u],
        4 => [v, -1.0, -u],
        5 => [v, u, -1.0],
        _ => unreachable!("face index out of range"),
    }
}

/// Quadratic warp from grid coordinate s ∈ [0, 1] to face coordinate
/// uv ∈ [-1, 1]. Monotone, and extends monotonically slightly past the
/// domain, which the cross-face neighbor wrap relies on.
fn st_to_uv(s: f64) -> f64 {
    if s >= 0.5 {
        (1.0 / 3.0) * (4.0 * s * s - 1.0)
    } else {
        -(1.0 / 3.0) * (4.0 * (1.0 - s) * (1.0 - s) - 1.0)
    }
}

/// Inverse of [`st_to_uv`].
fn uv_to_st(u: f64) -> f64 {
    if u >= 0.0 {
        0.5 * (1.0 + 3.0 * u).sqrt()
    } else {
        1.0 - 0.5 * (1.0 - 3.0 * u).sqrt()
    }
}

fn ij_to_st(ij: i64, level: u8, offset: f64) -> f64 {
    (ij as f64 + offset) / (1i64 << level) as f64
}

fn st_to_ij(s: f64, level: u8) -> u32 {
    let max = 1i64 << level;
    ((s * max as f64).floor() as i64).clamp(0, max - 1) as u32
}
