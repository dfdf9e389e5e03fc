//! Synthetic triangular meshes.
//!
//! [`triangular_lattice`] lays out a patch of equilateral triangles in
//! lon/lat: every interior vertex touches six cells, as on an icosahedral
//! grid away from the pentagon points.

use crate::data::field::{Field, FieldValues};
use crate::mesh_error::MeshError;
use crate::topology::builder::mesh_from_triangles;
use crate::topology::location::Location;
use crate::topology::mesh::Mesh;

/// Height of an equilateral triangle of unit side.
pub const ROW_HEIGHT: f64 = 0.866_025_403_784_438_6;

/// Equilateral lattice with `cols` triangle pairs per strip and `strips`
/// strips, starting at `origin = [lon, lat]` with side length `spacing`
/// (radians).
///
/// Vertex row `r` is shifted right by half a side when `r` is odd, so vertex
/// `i` of row `r` sits at `(i + (r % 2) / 2, r · √3/2)` in units of `spacing`.
/// Each strip holds `2 · cols` cells, so the mesh has `2 · cols · strips`
/// cells and `(cols + 1) · (strips + 1)` vertices.
///
/// The mesh carries two attributes: `cell_area` (per cell) and
/// `edge_length` (per edge).
pub fn triangular_lattice(
    cols: usize,
    strips: usize,
    origin: [f64; 2],
    spacing: f64,
) -> Result<Mesh, MeshError> {
    if cols == 0 || strips == 0 {
        return Err(MeshError::InvalidConfig(format!(
            "lattice needs at least one column and one strip, got {cols} x {strips}"
        )));
    }
    if !(spacing.is_finite() && spacing > 0.0) || !origin.iter().all(|v| v.is_finite()) {
        return Err(MeshError::InvalidConfig(format!(
            "lattice origin {origin:?} and spacing {spacing} must be finite, spacing positive"
        )));
    }

    let row_len = cols + 1;
    let vid = |i: usize, r: usize| r * row_len + i;

    let mut vlon = Vec::with_capacity(row_len * (strips + 1));
    let mut vlat = Vec::with_capacity(row_len * (strips + 1));
    for r in 0..=strips {
        let shift = if r % 2 == 1 { 0.5 } else { 0.0 };
        for i in 0..=cols {
            vlon.push(origin[0] + (i as f64 + shift) * spacing);
            vlat.push(origin[1] + r as f64 * ROW_HEIGHT * spacing);
        }
    }

    let mut triangles = Vec::with_capacity(2 * cols * strips);
    for r in 0..strips {
        for i in 0..cols {
            if r % 2 == 0 {
                triangles.push([vid(i, r), vid(i + 1, r), vid(i, r + 1)]);
                triangles.push([vid(i, r + 1), vid(i + 1, r), vid(i + 1, r + 1)]);
            } else {
                triangles.push([vid(i, r), vid(i + 1, r), vid(i + 1, r + 1)]);
                triangles.push([vid(i, r), vid(i + 1, r + 1), vid(i, r + 1)]);
            }
        }
    }

    let mut mesh = mesh_from_triangles(vlon, vlat, &triangles)?;
    let area = 0.5 * ROW_HEIGHT * spacing * spacing;
    mesh.attributes.insert(Field::on_location(
        "cell_area",
        Location::Cell,
        FieldValues::F64(vec![area; mesh.num_cells()]),
    ));
    mesh.attributes.insert(Field::on_location(
        "edge_length",
        Location::Edge,
        FieldValues::F64(vec![spacing; mesh.num_edges()]),
    ));
    Ok(mesh)
}
