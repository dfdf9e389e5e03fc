//! Algorithms on meshes: spatial hashing, cropping, consistency checks and
//! synthetic mesh generation.

pub mod consistency;
pub mod crop;
pub mod meshgen;
pub mod spatial_hash;

pub use consistency::{check_topology, verify_topology};
pub use crop::{CropOptions, CropRegion, CroppedMesh, RegionCropper, apply_crop, crop};
pub use spatial_hash::{BucketGrid, Lookup, MeshSpatialIndex, build_spatial_hash};
