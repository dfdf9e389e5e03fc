#![cfg_attr(docsrs, feature(doc_cfg))]
//! # icogrid
//!
//! icogrid manages unstructured triangular (icosahedral geodesic) grids made
//! of cells, edges and vertices, each with lon/lat coordinates in radians and
//! fixed-degree connectivity tables.
//!
//! ## Features
//! - A uniform bucket grid locating the element at a lon/lat point in O(1)
//!   ([`algs::spatial_hash`])
//! - Cropping a grid and its data to a lon/lat box, with every connectivity
//!   table re-derived in the compact index space ([`algs::crop`])
//! - Cross-checks of cell/edge/vertex adjacency ([`algs::consistency`])
//! - Grid-file interchange with 1-based indices and `-1` for "no neighbor"
//!   ([`topology::raw`])
//!
//! ## Indexing
//!
//! Inside the crate every connectivity entry is a [`topology::NeighborRef`]
//! (`Option<usize>`, 0-based). The 1-based / `-1` convention of grid files is
//! handled only by [`topology::RawMesh`].
//!
//! ## Determinism
//!
//! With or without the `rayon` feature, outputs and reported errors are
//! identical: parallel passes compute per-element results, and errors are
//! resolved in element order.
//!
//! ## Usage
//!
//! ```
//! use icogrid::prelude::*;
//!
//! let mesh = triangular_lattice(16, 12, [0.10, 0.80], 0.001)?;
//! let cropped = crop(&mesh, [0.1022, 0.1095], [0.8011, 0.8069])?;
//! assert!(check_topology(&cropped.mesh)?);
//!
//! let area = mesh.attributes.get("cell_area").unwrap();
//! let cropped_area = apply_crop(&cropped, area)?;
//! assert_eq!(cropped_area.len(), cropped.mesh.num_cells());
//! # Ok::<(), icogrid::mesh_error::MeshError>(())
//! ```

pub mod algs;
pub mod data;
pub mod debug_invariants;
pub mod geometry;
pub mod mesh_error;
pub mod topology;

pub use debug_invariants::DebugInvariants;
pub use mesh_error::{ErrorKind, MeshError};

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::consistency::{ConsistencyCheck, check_topology, verify_topology};
    pub use crate::algs::crop::{
        CropOptions, CropRegion, CroppedMesh, IndexSubset, RegionCropper, apply_crop, crop,
    };
    pub use crate::algs::meshgen::triangular_lattice;
    pub use crate::algs::spatial_hash::{
        BucketGrid, GridSpec, Lookup, MeshSpatialIndex, build_spatial_hash,
    };
    pub use crate::data::{Dataset, Dimension, Field, FieldValues, ScalarType};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::geometry::bounds::LonLatBox;
    pub use crate::mesh_error::{ErrorKind, MeshError};
    pub use crate::topology::builder::mesh_from_triangles;
    pub use crate::topology::{
        Connectivity, Coordinates, Location, Mesh, NeighborRef, RawMesh, TableField,
    };
}
