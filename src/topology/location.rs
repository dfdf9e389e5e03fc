//! Element kinds of a triangular grid.

use std::fmt;

/// The three interlocking element kinds of a triangular mesh.
///
/// A cell is a triangle bounded by three edges and three vertices.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Cell,
    Edge,
    Vertex,
}

impl Location {
    /// All locations in canonical order.
    pub const ALL: [Location; 3] = [Location::Cell, Location::Edge, Location::Vertex];

    /// Dimension name used by grid and data files for this location.
    pub fn as_str(self) -> &'static str {
        match self {
            Location::Cell => "cell",
            Location::Edge => "edge",
            Location::Vertex => "vertex",
        }
    }

    /// Map a dimension name (`cell`, `edge`, `vertex`) back to its location.
    pub fn from_dim_name(name: &str) -> Option<Self> {
        match name {
            "cell" => Some(Location::Cell),
            "edge" => Some(Location::Edge),
            "vertex" => Some(Location::Vertex),
            _ => None,
        }
    }

    /// Names of the lon/lat coordinate variables (`clon`/`clat`, ...).
    pub fn coordinate_names(self) -> (&'static str, &'static str) {
        match self {
            Location::Cell => ("clon", "clat"),
            Location::Edge => ("elon", "elat"),
            Location::Vertex => ("vlon", "vlat"),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
