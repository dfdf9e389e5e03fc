//! Data module: typed per-element fields and named datasets

pub mod dataset;
pub mod field;

pub use dataset::Dataset;
pub use field::{Dimension, Field, FieldValues, ScalarType};
