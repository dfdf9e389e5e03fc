//! Geometry utilities for icogrid.
//!
//! Lon/lat bounding boxes used for crop regions and hash-grid extents.

pub mod bounds;

pub use bounds::LonLatBox;
