//! Mesh topology: element kinds, connectivity tables and the [`Mesh`] itself.
//!
//! - [`location`]: the three element kinds (cell, edge, vertex)
//! - [`neighbor`]: table entries and the grid-file index convention
//! - [`connectivity`]: the eight fixed-degree tables
//! - [`mesh`]: coordinates plus tables
//! - [`validation`]: local structural checks
//! - [`raw`]: grid-file interchange form
//! - [`builder`]: derive a mesh from a triangle list

pub mod builder;
pub mod connectivity;
pub mod location;
pub mod mesh;
pub mod neighbor;
pub mod raw;
pub mod validation;

pub use connectivity::{Connectivity, TableField};
pub use location::Location;
pub use mesh::{Coordinates, Mesh};
pub use neighbor::NeighborRef;
pub use raw::RawMesh;
