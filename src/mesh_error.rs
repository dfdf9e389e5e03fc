//! MeshError: unified error type for icogrid public APIs
//!
//! Every detected invariant violation is reported synchronously through this
//! type. None of the operations retry internally: the inputs are deterministic,
//! so a repeated attempt on the same data fails the same way.

use thiserror::Error;

use crate::algs::consistency::ConsistencyCheck;
use crate::geometry::bounds::LonLatBox;
use crate::topology::connectivity::TableField;
use crate::topology::location::Location;
use crate::topology::neighbor::NeighborRef;

/// Coarse error category, mirroring the failure taxonomy callers act on.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// Requested region is invalid, disjoint from the mesh, or selects nothing.
    DomainBounds,
    /// Connectivity data violates a structural invariant.
    MalformedMesh,
    /// Coordinates span no area, so no bucket grid can be laid over them.
    DegenerateGrid,
    /// Two elements landed in the same spatial bucket.
    HashCollision,
    /// Post-crop index range check failed.
    ReindexInvariant,
    /// Two independent adjacency derivations disagree.
    TopologyMismatch,
    /// Field data does not match the mesh it is applied to.
    InvalidField,
    /// Option values out of range.
    InvalidConfig,
}

/// Unified error type for icogrid operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    /// The requested crop region does not intersect the mesh's cell extent.
    #[error("region of interest {requested} not within the grid domain {domain}")]
    DomainBounds {
        requested: LonLatBox,
        domain: LonLatBox,
    },
    /// Region bounds are not finite or not strictly increasing.
    #[error("invalid region bounds: lon {lon:?}, lat {lat:?}")]
    InvalidBounds { lon: [f64; 2], lat: [f64; 2] },
    /// The region intersects the mesh extent but contains no cell center.
    #[error("no cell center lies strictly inside {requested}")]
    EmptySelection { requested: LonLatBox },

    /// `edge_of_cell` carries the no-neighbor sentinel.
    #[error("edge_of_cell of cell {cell} has no edge in slot {slot}")]
    MissingEdge { cell: usize, slot: usize },
    /// A same-kind adjacency table lists an element as its own neighbor.
    #[error("{field} of {} {index} references itself", .field.source())]
    SelfReference { field: TableField, index: usize },
    /// A table entry points past the end of its target element kind.
    #[error("{field} of {} {index} references {} {value}, but only {count} exist", .field.source(), .field.target())]
    IndexOutOfRange {
        field: TableField,
        index: usize,
        value: usize,
        count: usize,
    },
    /// A raw (1-based) table entry is neither a valid index nor the -1 sentinel.
    #[error("{field} of {} {index} holds invalid raw index {raw}", .field.source())]
    InvalidRawIndex {
        field: TableField,
        index: usize,
        raw: i64,
    },
    /// An array has the wrong number of entries.
    #[error("{what}: expected {expected} entries, found {found}")]
    LengthMismatch {
        what: String,
        expected: usize,
        found: usize,
    },
    /// An element has more neighbors than its table's fixed degree allows.
    #[error("{field} of {} {index} needs more than {degree} entries", .field.source())]
    DegreeOverflow {
        field: TableField,
        index: usize,
        degree: usize,
    },
    /// A triangle references missing or repeated vertices.
    #[error("triangle {index} is invalid: {reason}")]
    InvalidTriangle { index: usize, reason: String },

    /// Coordinates cannot be covered by a bucket grid.
    #[error(
        "cannot hash {count} {location} coordinates with extent {lon_extent} x {lat_extent}"
    )]
    DegenerateExtent {
        location: Location,
        count: usize,
        lon_extent: f64,
        lat_extent: f64,
    },
    /// Two elements map to the same bucket.
    #[error(
        "{location} {first} and {location} {second} collide in bucket {bucket:?}; bucket size too coarse or duplicate coordinates"
    )]
    HashCollision {
        location: Location,
        bucket: (usize, usize),
        first: usize,
        second: usize,
    },
    /// Reindexing produced indices inconsistent with the retained subset.
    #[error("wrong indices after crop operation in {field}: {reason}")]
    ReindexInvariant { field: TableField, reason: String },
    /// Direct and two-hop adjacency disagree for one element.
    #[error(
        "{check} mismatch at {} {index}: derived {derived:?}, table {expected:?}", .check.location()
    )]
    TopologyMismatch {
        check: ConsistencyCheck,
        index: usize,
        derived: Vec<NeighborRef>,
        expected: Vec<NeighborRef>,
    },

    /// Field dimensions disagree with the mesh.
    #[error("field `{name}`: {reason}")]
    FieldShape { name: String, reason: String },
    /// Option value out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MeshError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MeshError::DomainBounds { .. }
            | MeshError::InvalidBounds { .. }
            | MeshError::EmptySelection { .. } => ErrorKind::DomainBounds,
            MeshError::MissingEdge { .. }
            | MeshError::SelfReference { .. }
            | MeshError::IndexOutOfRange { .. }
            | MeshError::InvalidRawIndex { .. }
            | MeshError::LengthMismatch { .. }
            | MeshError::DegreeOverflow { .. }
            | MeshError::InvalidTriangle { .. } => ErrorKind::MalformedMesh,
            MeshError::DegenerateExtent { .. } => ErrorKind::DegenerateGrid,
            MeshError::HashCollision { .. } => ErrorKind::HashCollision,
            MeshError::ReindexInvariant { .. } => ErrorKind::ReindexInvariant,
            MeshError::TopologyMismatch { .. } => ErrorKind::TopologyMismatch,
            MeshError::FieldShape { .. } => ErrorKind::InvalidField,
            MeshError::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }
}
