//! `NeighborRef`: a connectivity-table entry.
//!
//! Inside the crate every table entry is an `Option<usize>` holding a 0-based
//! index into the target element kind, with `None` meaning "no neighbor"
//! (mesh boundary or an element dropped by a crop).
//!
//! Grid files use a different convention: 1-based indices, `-1` for "no
//! neighbor", and `0` never valid. [`decode_raw`] and [`encode_raw`] are the
//! only places that convention is handled.

use crate::mesh_error::MeshError;
use crate::topology::connectivity::TableField;

/// A connectivity-table entry: `Some(index)` (0-based) or `None`.
pub type NeighborRef = Option<usize>;

/// Raw sentinel for "no neighbor" in the file representation.
pub const RAW_NO_NEIGHBOR: i64 = -1;

/// Convert one raw 1-based entry of `field` (row `index`) to a [`NeighborRef`].
///
/// `-1` maps to `None`; positive values map to `Some(raw - 1)`. Zero and
/// values below `-1` are rejected.
pub fn decode_raw(field: TableField, index: usize, raw: i64) -> Result<NeighborRef, MeshError> {
    match raw {
        RAW_NO_NEIGHBOR => Ok(None),
        r if r > 0 => Ok(Some((r - 1) as usize)),
        _ => Err(MeshError::InvalidRawIndex { field, index, raw }),
    }
}

/// Convert a [`NeighborRef`] back to the raw 1-based representation.
#[inline]
pub fn encode_raw(entry: NeighborRef) -> i64 {
    match entry {
        Some(i) => i as i64 + 1,
        None => RAW_NO_NEIGHBOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_and_offsets() {
        let f = TableField::EdgeVertices;
        assert_eq!(decode_raw(f, 0, -1).unwrap(), None);
        assert_eq!(decode_raw(f, 0, 1).unwrap(), Some(0));
        assert_eq!(decode_raw(f, 0, 42).unwrap(), Some(41));
        assert_eq!(encode_raw(Some(41)), 42);
        assert_eq!(encode_raw(None), -1);
    }

    #[test]
    fn zero_and_below_sentinel_rejected() {
        let f = TableField::CellsOfVertex;
        for raw in [0, -2, -100] {
            let err = decode_raw(f, 3, raw).unwrap_err();
            assert_eq!(
                err,
                MeshError::InvalidRawIndex {
                    field: f,
                    index: 3,
                    raw
                }
            );
        }
    }
}
