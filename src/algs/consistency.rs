//! Cross-table topology consistency.
//!
//! Each check derives one adjacency relation a second way, through edges, and
//! compares it element by element with the stored table:
//!
//! | check | derived via | compared with |
//! |---|---|---|
//! | `cell2cell` | `edge_of_cell` → `adjacent_cell_of_edge`, minus the cell itself | `neighbor_cell_index` |
//! | `cell2vertex` | `edge_of_cell` → `edge_vertices`, deduplicated | `vertex_of_cell` |
//! | `vertex2cell` | `edges_of_vertex` → `adjacent_cell_of_edge`, deduplicated | `cells_of_vertex` |
//!
//! Rows are compared as sorted lists, `None` included, after padding the
//! derived side with `None` up to the table degree.

use std::fmt;

use itertools::Itertools;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::mesh_error::MeshError;
use crate::topology::connectivity::{Connectivity, TableField};
use crate::topology::location::Location;
use crate::topology::mesh::Mesh;
use crate::topology::neighbor::NeighborRef;
use crate::topology::validation::validate_mesh_structure;

/// The three derivations compared by [`check_topology`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ConsistencyCheck {
    CellToCell,
    CellToVertex,
    VertexToCell,
}

impl ConsistencyCheck {
    pub const ALL: [ConsistencyCheck; 3] = [
        ConsistencyCheck::CellToCell,
        ConsistencyCheck::CellToVertex,
        ConsistencyCheck::VertexToCell,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ConsistencyCheck::CellToCell => "cell2cell",
            ConsistencyCheck::CellToVertex => "cell2vertex",
            ConsistencyCheck::VertexToCell => "vertex2cell",
        }
    }

    /// Kind of element the check iterates over.
    pub fn location(self) -> Location {
        match self {
            ConsistencyCheck::CellToCell | ConsistencyCheck::CellToVertex => Location::Cell,
            ConsistencyCheck::VertexToCell => Location::Vertex,
        }
    }

    /// Table the derived relation is compared against.
    pub fn table(self) -> TableField {
        match self {
            ConsistencyCheck::CellToCell => TableField::NeighborCellIndex,
            ConsistencyCheck::CellToVertex => TableField::VertexOfCell,
            ConsistencyCheck::VertexToCell => TableField::CellsOfVertex,
        }
    }

    /// Run this check on `mesh`.
    pub fn run(self, mesh: &Mesh) -> Result<(), MeshError> {
        match self {
            ConsistencyCheck::CellToCell => check_cell2cell(mesh),
            ConsistencyCheck::CellToVertex => check_cell2vertex(mesh),
            ConsistencyCheck::VertexToCell => check_vertex2cell(mesh),
        }
    }
}

impl fmt::Display for ConsistencyCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `neighbor_cell_index` agrees with cell → edge → cell.
pub fn check_cell2cell(mesh: &Mesh) -> Result<(), MeshError> {
    let check = ConsistencyCheck::CellToCell;
    first_failure(mesh.num_cells(), |cell| {
        let mut derived = Vec::with_capacity(3);
        for (slot, &edge) in mesh.edge_of_cell.row(cell).iter().enumerate() {
            let edge = edge.ok_or(MeshError::MissingEdge { cell, slot })?;
            let pair = target_row(&mesh.adjacent_cell_of_edge, &mesh.edge_of_cell, cell, edge)?;
            match pair.iter().position(|&c| c == Some(cell)) {
                Some(own) => derived.push(pair[1 - own]),
                // the edge does not know this cell; keep both so the row
                // cannot match
                None => derived.extend_from_slice(pair),
            }
        }
        compare(check, cell, derived, mesh.neighbor_cell_index.row(cell))
    })
}

/// `vertex_of_cell` agrees with cell → edge → vertex.
pub fn check_cell2vertex(mesh: &Mesh) -> Result<(), MeshError> {
    let check = ConsistencyCheck::CellToVertex;
    first_failure(mesh.num_cells(), |cell| {
        let mut derived = Vec::with_capacity(6);
        for (slot, &edge) in mesh.edge_of_cell.row(cell).iter().enumerate() {
            let edge = edge.ok_or(MeshError::MissingEdge { cell, slot })?;
            let ends = target_row(&mesh.edge_vertices, &mesh.edge_of_cell, cell, edge)?;
            derived.extend(ends.iter().filter(|v| v.is_some()));
        }
        compare(check, cell, unique(derived), mesh.vertex_of_cell.row(cell))
    })
}

/// `cells_of_vertex` agrees with vertex → edge → cell.
pub fn check_vertex2cell(mesh: &Mesh) -> Result<(), MeshError> {
    let check = ConsistencyCheck::VertexToCell;
    first_failure(mesh.num_vertices(), |vertex| {
        let mut derived = Vec::with_capacity(12);
        for &edge in mesh.edges_of_vertex.row(vertex) {
            match edge {
                Some(edge) => derived.extend_from_slice(target_row(
                    &mesh.adjacent_cell_of_edge,
                    &mesh.edges_of_vertex,
                    vertex,
                    edge,
                )?),
                None => derived.extend([None, None]),
            }
        }
        compare(check, vertex, unique(derived), mesh.cells_of_vertex.row(vertex))
    })
}

/// Structural validation followed by all three consistency checks.
///
/// Returns the first violation as an error.
pub fn verify_topology(mesh: &Mesh) -> Result<(), MeshError> {
    validate_mesh_structure(mesh)?;
    for check in ConsistencyCheck::ALL {
        check.run(mesh)?;
    }
    Ok(())
}

/// `Ok(true)` when every derivation agrees, `Ok(false)` when two disagree.
///
/// Malformed meshes (self-references, missing cell edges, out-of-range
/// indices, wrong table shapes) are errors rather than `false`.
pub fn check_topology(mesh: &Mesh) -> Result<bool, MeshError> {
    match verify_topology(mesh) {
        Ok(()) => Ok(true),
        Err(MeshError::TopologyMismatch {
            check,
            index,
            derived,
            expected,
        }) => {
            log::debug!(
                "{check} mismatch at {} {index}: derived {derived:?}, table {expected:?}",
                check.location()
            );
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Row `target` of `table`, reported against the referring table when out of
/// range.
fn target_row<'a>(
    table: &'a Connectivity,
    referrer: &Connectivity,
    index: usize,
    target: usize,
) -> Result<&'a [NeighborRef], MeshError> {
    table.get(target).ok_or(MeshError::IndexOutOfRange {
        field: referrer.field(),
        index,
        value: target,
        count: table.len(),
    })
}

fn unique(entries: Vec<NeighborRef>) -> Vec<NeighborRef> {
    entries.into_iter().sorted_unstable().dedup().collect()
}

fn compare(
    check: ConsistencyCheck,
    index: usize,
    mut derived: Vec<NeighborRef>,
    stored: &[NeighborRef],
) -> Result<(), MeshError> {
    if derived.len() < stored.len() {
        derived.resize(stored.len(), None);
    }
    derived.sort_unstable();
    let expected: Vec<NeighborRef> = stored.iter().copied().sorted_unstable().collect();
    if derived == expected {
        Ok(())
    } else {
        Err(MeshError::TopologyMismatch {
            check,
            index,
            derived,
            expected,
        })
    }
}

/// Run `f` for `0..n`, returning the error of the lowest failing element.
fn first_failure<F>(n: usize, f: F) -> Result<(), MeshError>
where
    F: Fn(usize) -> Result<(), MeshError> + Sync + Send,
{
    #[cfg(feature = "rayon")]
    let failure = (0..n).into_par_iter().find_map_first(|i| f(i).err());
    #[cfg(not(feature = "rayon"))]
    let failure = (0..n).find_map(|i| f(i).err());
    failure.map_or(Ok(()), Err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::meshgen::triangular_lattice;
    use crate::mesh_error::ErrorKind;

    fn lattice() -> Mesh {
        triangular_lattice(6, 4, [0.3, 0.9], 0.001).unwrap()
    }

    #[test]
    fn generated_lattice_is_consistent() {
        let mesh = lattice();
        for check in ConsistencyCheck::ALL {
            check.run(&mesh).unwrap();
        }
        assert!(check_topology(&mesh).unwrap());
    }

    #[test]
    fn swapped_neighbor_is_a_mismatch() {
        let mut mesh = lattice();
        // point cell 0's first real neighbor elsewhere
        let row = mesh.neighbor_cell_index.row(0).to_vec();
        let slot = row.iter().position(Option::is_some).unwrap();
        let far = mesh.num_cells() - 1;
        mesh.neighbor_cell_index.entries_mut()[slot] = Some(far);
        let err = check_cell2cell(&mesh).unwrap_err();
        assert!(matches!(
            err,
            MeshError::TopologyMismatch {
                check: ConsistencyCheck::CellToCell,
                index: 0,
                ..
            }
        ));
        assert!(!check_topology(&mesh).unwrap());
    }

    #[test]
    fn dropped_vertex_is_a_mismatch() {
        let mut mesh = lattice();
        mesh.vertex_of_cell.entries_mut()[3 * 3] = None;
        let err = verify_topology(&mesh).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TopologyMismatch);
        assert!(err.to_string().starts_with("cell2vertex mismatch at cell 3"));
    }

    #[test]
    fn vertex_cells_compared_as_sets() {
        let mut mesh = lattice();
        let v = mesh
            .cells_of_vertex
            .rows()
            .position(|r| r.iter().flatten().count() >= 2)
            .unwrap();
        let row = &mut mesh.cells_of_vertex.entries_mut()[v * 6..(v + 1) * 6];
        row.reverse();
        check_vertex2cell(&mesh).unwrap();
        row_remove_one(&mut mesh, v);
        assert!(matches!(
            check_vertex2cell(&mesh),
            Err(MeshError::TopologyMismatch { index, .. }) if index == v
        ));
    }

    fn row_remove_one(mesh: &mut Mesh, v: usize) {
        let row = &mut mesh.cells_of_vertex.entries_mut()[v * 6..(v + 1) * 6];
        let pos = row.iter().position(Option::is_some).unwrap();
        row[pos] = None;
    }

    #[test]
    fn malformed_mesh_is_an_error_not_false() {
        let mut mesh = lattice();
        mesh.neighbor_cell_index.entries_mut()[4 * 3] = Some(4);
        assert_eq!(
            check_topology(&mesh).unwrap_err(),
            MeshError::SelfReference {
                field: TableField::NeighborCellIndex,
                index: 4
            }
        );

        let mut mesh = lattice();
        mesh.edge_of_cell.entries_mut()[7 * 3 + 1] = None;
        assert_eq!(
            check_topology(&mesh).unwrap_err(),
            MeshError::MissingEdge { cell: 7, slot: 1 }
        );
        assert!(check_cell2vertex(&mesh).is_err());
    }
}
