//! Typed, dimensioned per-element field data.
//!
//! A [`Field`] is a dense row-major array with named dimensions, such as
//! `(time, level, cell)`. Dimensions named `cell`, `edge` or `vertex` are
//! *location* dimensions; cropping a field gathers along those axes and leaves
//! every other axis untouched. Values keep their scalar type: restricting an
//! `f32` field yields an `f32` field with the very same values.

use crate::mesh_error::MeshError;
use crate::topology::location::Location;

/// Scalar type tag for field values.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    F64,
    F32,
    I32,
    I64,
    U32,
    U64,
}

impl ScalarType {
    /// Returns a stable string label for the scalar type.
    pub fn as_str(self) -> &'static str {
        match self {
            ScalarType::F64 => "f64",
            ScalarType::F32 => "f32",
            ScalarType::I32 => "i32",
            ScalarType::I64 => "i64",
            ScalarType::U32 => "u32",
            ScalarType::U64 => "u64",
        }
    }
}

/// Tagged value buffer of a field.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum FieldValues {
    F64(Vec<f64>),
    F32(Vec<f32>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U32(Vec<u32>),
    U64(Vec<u64>),
}

impl FieldValues {
    /// Return the scalar type tag for this buffer.
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            FieldValues::F64(_) => ScalarType::F64,
            FieldValues::F32(_) => ScalarType::F32,
            FieldValues::I32(_) => ScalarType::I32,
            FieldValues::I64(_) => ScalarType::I64,
            FieldValues::U32(_) => ScalarType::U32,
            FieldValues::U64(_) => ScalarType::U64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FieldValues::F64(v) => v.len(),
            FieldValues::F32(v) => v.len(),
            FieldValues::I32(v) => v.len(),
            FieldValues::I64(v) => v.len(),
            FieldValues::U32(v) => v.len(),
            FieldValues::U64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn gather_axis(&self, axis: AxisSplit, keep: &[usize]) -> FieldValues {
        match self {
            FieldValues::F64(v) => FieldValues::F64(gather_axis(v, axis, keep)),
            FieldValues::F32(v) => FieldValues::F32(gather_axis(v, axis, keep)),
            FieldValues::I32(v) => FieldValues::I32(gather_axis(v, axis, keep)),
            FieldValues::I64(v) => FieldValues::I64(gather_axis(v, axis, keep)),
            FieldValues::U32(v) => FieldValues::U32(gather_axis(v, axis, keep)),
            FieldValues::U64(v) => FieldValues::U64(gather_axis(v, axis, keep)),
        }
    }
}

/// A named dimension with its length.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Dimension {
    pub name: String,
    pub len: usize,
}

impl Dimension {
    pub fn new(name: impl Into<String>, len: usize) -> Self {
        Self {
            name: name.into(),
            len,
        }
    }

    /// Dimension over the elements of `location`.
    pub fn location(location: Location, len: usize) -> Self {
        Self::new(location.as_str(), len)
    }

    /// The mesh location this dimension runs over, if any.
    pub fn as_location(&self) -> Option<Location> {
        Location::from_dim_name(&self.name)
    }
}

/// A named, dimensioned field of typed values (row-major).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Field {
    pub name: String,
    dims: Vec<Dimension>,
    values: FieldValues,
}

impl Field {
    /// Build a field, checking that the dimension lengths multiply to the
    /// number of values.
    pub fn new(
        name: impl Into<String>,
        dims: Vec<Dimension>,
        values: FieldValues,
    ) -> Result<Self, MeshError> {
        let field = Self {
            name: name.into(),
            dims,
            values,
        };
        field.check_shape()?;
        Ok(field)
    }

    /// One-dimensional field over a mesh location.
    pub fn on_location(
        name: impl Into<String>,
        location: Location,
        values: FieldValues,
    ) -> Self {
        let len = values.len();
        Self {
            name: name.into(),
            dims: vec![Dimension::location(location, len)],
            values,
        }
    }

    /// Verify `product(dims) == values.len()`; needed after deserialization.
    pub fn check_shape(&self) -> Result<(), MeshError> {
        let expected: usize = self.dims.iter().map(|d| d.len).product();
        if expected != self.values.len() {
            return Err(MeshError::FieldShape {
                name: self.name.clone(),
                reason: format!(
                    "dimensions {:?} need {expected} values, found {}",
                    self.dims.iter().map(|d| (&d.name, d.len)).collect::<Vec<_>>(),
                    self.values.len()
                ),
            });
        }
        Ok(())
    }

    pub fn dims(&self) -> &[Dimension] {
        &self.dims
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    pub fn scalar_type(&self) -> ScalarType {
        self.values.scalar_type()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Length of the first dimension over `location`, if present.
    pub fn location_len(&self, location: Location) -> Option<usize> {
        self.dims
            .iter()
            .find(|d| d.as_location() == Some(location))
            .map(|d| d.len)
    }

    /// Whether any dimension runs over `location`.
    pub fn has_location(&self, location: Location) -> bool {
        self.location_len(location).is_some()
    }

    /// Keep only the elements `keep` (0-based, in order) along every axis over
    /// `location`. `source_len` is the element count the field must have along
    /// those axes.
    pub fn restrict(
        &self,
        location: Location,
        source_len: usize,
        keep: &[usize],
    ) -> Result<Field, MeshError> {
        self.check_shape()?;
        let mut dims = self.dims.clone();
        let mut values = self.values.clone();
        for axis in 0..dims.len() {
            if dims[axis].as_location() != Some(location) {
                continue;
            }
            if dims[axis].len != source_len {
                return Err(MeshError::FieldShape {
                    name: self.name.clone(),
                    reason: format!(
                        "{location} dimension has {} entries but the mesh has {source_len}",
                        dims[axis].len
                    ),
                });
            }
            if let Some(&bad) = keep.iter().find(|&&k| k >= source_len) {
                return Err(MeshError::FieldShape {
                    name: self.name.clone(),
                    reason: format!("{location} {bad} out of range for length {source_len}"),
                });
            }
            let split = AxisSplit::of(&dims, axis);
            values = values.gather_axis(split, keep);
            dims[axis].len = keep.len();
        }
        Ok(Field {
            name: self.name.clone(),
            dims,
            values,
        })
    }

    pub fn as_f64(&self) -> Option<&[f64]> {
        match &self.values {
            FieldValues::F64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<&[f32]> {
        match &self.values {
            FieldValues::F32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<&[i32]> {
        match &self.values {
            FieldValues::I32(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct AxisSplit {
    outer: usize,
    len: usize,
    inner: usize,
}

impl AxisSplit {
    fn of(dims: &[Dimension], axis: usize) -> Self {
        Self {
            outer: dims[..axis].iter().map(|d| d.len).product(),
            len: dims[axis].len,
            inner: dims[axis + 1..].iter().map(|d| d.len).product(),
        }
    }
}

fn gather_axis<T: Copy>(values: &[T], axis: AxisSplit, keep: &[usize]) -> Vec<T> {
    let AxisSplit { outer, len, inner } = axis;
    let mut out = Vec::with_capacity(outer * keep.len() * inner);
    for o in 0..outer {
        let block = &values[o * len * inner..(o + 1) * len * inner];
        for &k in keep {
            out.extend_from_slice(&block[k * inner..(k + 1) * inner]);
        }
    }
    out
}
