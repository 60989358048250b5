//! The [`Portal`] type — a geographic point of interest with a stable id.

use std::fmt;

use crate::geo::LatLng;

/// Opaque stable identifier of a portal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PortalId(pub String);

impl PortalId {
    /// The id as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PortalId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for PortalId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for PortalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A portal: stable id, display name, and position. Immutable once created.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Portal {
    pub id: PortalId,
    pub name: String,
    pub pos: LatLng,
}

impl Portal {
    /// Create a new portal.
    pub fn new(id: impl Into<PortalId>, name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            pos: LatLng::new(lat, lng),
        }
    }
}
