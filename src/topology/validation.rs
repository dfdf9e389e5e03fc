//! Structural validation of a [`Mesh`].
//!
//! These checks are local (one table at a time) and linear in the mesh size.
//! Cross-table agreement is the job of [`crate::algs::consistency`].

use crate::mesh_error::MeshError;
use crate::topology::connectivity::{Connectivity, TableField};
use crate::topology::location::Location;
use crate::topology::mesh::Mesh;

/// Validation toggles for [`validate_mesh_with`].
#[derive(Debug, Clone, Copy)]
pub struct MeshValidationOptions {
    /// Coordinate arrays and table row counts match the element counts.
    pub check_shapes: bool,
    /// Every `Some` entry indexes an existing target element.
    pub check_ranges: bool,
    /// Same-kind tables never list the element itself.
    pub check_self_references: bool,
    /// `edge_of_cell` never holds the no-neighbor sentinel.
    pub check_cell_edges: bool,
    /// Per-element attributes have the mesh's element counts.
    pub check_attributes: bool,
}

impl MeshValidationOptions {
    /// Enable all checks.
    pub fn all() -> Self {
        Self {
            check_shapes: true,
            check_ranges: true,
            check_self_references: true,
            check_cell_edges: true,
            check_attributes: true,
        }
    }
}

impl Default for MeshValidationOptions {
    fn default() -> Self {
        Self::all()
    }
}

/// Run every structural check; returns the first violation.
pub fn validate_mesh_structure(mesh: &Mesh) -> Result<(), MeshError> {
    validate_mesh_with(mesh, MeshValidationOptions::all())
}

/// Run the selected structural checks; returns the first violation.
pub fn validate_mesh_with(mesh: &Mesh, options: MeshValidationOptions) -> Result<(), MeshError> {
    if options.check_shapes {
        for loc in Location::ALL {
            let coords = mesh.coords(loc);
            if coords.lat.len() != coords.lon.len() {
                let (lon_name, lat_name) = loc.coordinate_names();
                return Err(MeshError::LengthMismatch {
                    what: format!("{lat_name} (vs {lon_name})"),
                    expected: coords.lon.len(),
                    found: coords.lat.len(),
                });
            }
        }
        for field in TableField::ALL {
            check_table_shape(mesh, field)?;
        }
    }
    if options.check_ranges {
        for field in TableField::ALL {
            check_table_range(mesh.table(field), mesh.count(field.target()))?;
        }
    }
    if options.check_self_references {
        check_no_self_reference(&mesh.neighbor_cell_index)?;
        check_no_self_reference(&mesh.vertices_of_vertex)?;
    }
    if options.check_cell_edges {
        check_cell_edges(&mesh.edge_of_cell)?;
    }
    if options.check_attributes {
        mesh.attributes.check_against(|loc| mesh.count(loc))?;
    }
    Ok(())
}

fn check_table_shape(mesh: &Mesh, field: TableField) -> Result<(), MeshError> {
    let table = mesh.table(field);
    if table.field() != field {
        return Err(MeshError::LengthMismatch {
            what: format!("{field} slot holds {} table", table.field()),
            expected: field.degree(),
            found: table.degree(),
        });
    }
    let expected = mesh.count(field.source());
    if table.len() != expected {
        return Err(MeshError::LengthMismatch {
            what: format!("{field} rows"),
            expected,
            found: table.len(),
        });
    }
    Ok(())
}

/// Every `Some` entry must be below `target_count`.
pub fn check_table_range(table: &Connectivity, target_count: usize) -> Result<(), MeshError> {
    for (index, row) in table.rows().enumerate() {
        for &value in row.iter().flatten() {
            if value >= target_count {
                return Err(MeshError::IndexOutOfRange {
                    field: table.field(),
                    index,
                    value,
                    count: target_count,
                });
            }
        }
    }
    Ok(())
}

/// A same-kind table never lists a row's own element.
pub fn check_no_self_reference(table: &Connectivity) -> Result<(), MeshError> {
    debug_assert!(table.field().is_self_adjacency());
    for (index, row) in table.rows().enumerate() {
        if row.contains(&Some(index)) {
            return Err(MeshError::SelfReference {
                field: table.field(),
                index,
            });
        }
    }
    Ok(())
}

/// Every cell has three bounding edges.
pub fn check_cell_edges(edge_of_cell: &Connectivity) -> Result<(), MeshError> {
    for (cell, row) in edge_of_cell.rows().enumerate() {
        if let Some(slot) = row.iter().position(Option::is_none) {
            return Err(MeshError::MissingEdge { cell, slot });
        }
    }
    Ok(())
}
