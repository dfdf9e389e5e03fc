//! Build a [`Mesh`] from vertex coordinates and a triangle list.
//!
//! Edges are numbered in order of first appearance while walking the
//! triangles; triangle `(a, b, c)` owns the edges `(a, b)`, `(b, c)`, `(c, a)`
//! in that slot order. Cell coordinates are triangle centroids and edge
//! coordinates edge midpoints, taken in plain lon/lat.

use hashbrown::HashMap;

use crate::data::dataset::Dataset;
use crate::mesh_error::MeshError;
use crate::topology::connectivity::{Connectivity, TableField};
use crate::topology::mesh::{Coordinates, Mesh};
use crate::topology::neighbor::NeighborRef;

/// Derive all eight connectivity tables of a triangle soup.
///
/// # Errors
/// - [`MeshError::LengthMismatch`] if `vlon` and `vlat` differ in length.
/// - [`MeshError::InvalidTriangle`] for out-of-range or repeated vertices.
/// - [`MeshError::DegreeOverflow`] for an edge shared by more than two
///   triangles or a vertex touching more than six cells, edges or vertices.
pub fn mesh_from_triangles(
    vlon: Vec<f64>,
    vlat: Vec<f64>,
    triangles: &[[usize; 3]],
) -> Result<Mesh, MeshError> {
    if vlon.len() != vlat.len() {
        return Err(MeshError::LengthMismatch {
            what: "vlat (vs vlon)".into(),
            expected: vlon.len(),
            found: vlat.len(),
        });
    }
    let n_vertices = vlon.len();
    for (index, tri) in triangles.iter().enumerate() {
        if let Some(&v) = tri.iter().find(|&&v| v >= n_vertices) {
            return Err(MeshError::InvalidTriangle {
                index,
                reason: format!("vertex {v} out of range for {n_vertices} vertices"),
            });
        }
        if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
            return Err(MeshError::InvalidTriangle {
                index,
                reason: format!("repeated vertex in {tri:?}"),
            });
        }
    }

    // edges keyed by sorted endpoint pair
    let mut edge_ids: HashMap<(usize, usize), usize> = HashMap::with_capacity(triangles.len() * 2);
    let mut edge_ends: Vec<[usize; 2]> = Vec::with_capacity(triangles.len() * 2);
    let mut edge_cells: Vec<Vec<usize>> = Vec::with_capacity(triangles.len() * 2);
    let mut edge_of_cell = Vec::with_capacity(triangles.len() * 3);

    for (cell, &[a, b, c]) in triangles.iter().enumerate() {
        for (p, q) in [(a, b), (b, c), (c, a)] {
            let key = (p.min(q), p.max(q));
            let e = *edge_ids.entry(key).or_insert_with(|| {
                edge_ends.push([p, q]);
                edge_cells.push(Vec::with_capacity(2));
                edge_ends.len() - 1
            });
            let cells = &mut edge_cells[e];
            if cells.len() == TableField::AdjacentCellOfEdge.degree() {
                return Err(MeshError::DegreeOverflow {
                    field: TableField::AdjacentCellOfEdge,
                    index: e,
                    degree: TableField::AdjacentCellOfEdge.degree(),
                });
            }
            cells.push(cell);
            edge_of_cell.push(Some(e));
        }
    }
    let n_edges = edge_ends.len();

    let neighbor_cell_index: Vec<NeighborRef> = edge_of_cell
        .iter()
        .enumerate()
        .map(|(slot, e)| {
            let cell = slot / 3;
            e.and_then(|e| edge_cells[e].iter().copied().find(|&c| c != cell))
        })
        .collect();

    let mut cells_of_vertex = vec![Vec::new(); n_vertices];
    for (cell, tri) in triangles.iter().enumerate() {
        for &v in tri {
            cells_of_vertex[v].push(cell);
        }
    }
    let mut edges_of_vertex = vec![Vec::new(); n_vertices];
    let mut vertices_of_vertex = vec![Vec::new(); n_vertices];
    for (e, &[p, q]) in edge_ends.iter().enumerate() {
        edges_of_vertex[p].push(e);
        edges_of_vertex[q].push(e);
        vertices_of_vertex[p].push(q);
        vertices_of_vertex[q].push(p);
    }

    let cells = Coordinates::new(
        triangles
            .iter()
            .map(|t| t.iter().map(|&v| vlon[v]).sum::<f64>() / 3.0)
            .collect(),
        triangles
            .iter()
            .map(|t| t.iter().map(|&v| vlat[v]).sum::<f64>() / 3.0)
            .collect(),
    );
    let edges = Coordinates::new(
        edge_ends.iter().map(|&[p, q]| 0.5 * (vlon[p] + vlon[q])).collect(),
        edge_ends.iter().map(|&[p, q]| 0.5 * (vlat[p] + vlat[q])).collect(),
    );

    let tables = vec![
        Connectivity::new(TableField::EdgeOfCell, edge_of_cell)?,
        Connectivity::new(
            TableField::VertexOfCell,
            triangles.iter().flatten().map(|&v| Some(v)).collect(),
        )?,
        padded(TableField::AdjacentCellOfEdge, &edge_cells)?,
        Connectivity::new(
            TableField::EdgeVertices,
            edge_ends.iter().flatten().map(|&v| Some(v)).collect(),
        )?,
        padded(TableField::CellsOfVertex, &cells_of_vertex)?,
        padded(TableField::EdgesOfVertex, &edges_of_vertex)?,
        padded(TableField::VerticesOfVertex, &vertices_of_vertex)?,
        Connectivity::new(TableField::NeighborCellIndex, neighbor_cell_index)?,
    ];
    debug_assert_eq!(tables[2].len(), n_edges);

    Mesh::new(
        cells,
        edges,
        Coordinates::new(vlon, vlat),
        tables,
        Dataset::new(),
    )
}

/// Lay variable-length rows into a fixed-degree table, padding with `None`.
fn padded(field: TableField, rows: &[Vec<usize>]) -> Result<Connectivity, MeshError> {
    let degree = field.degree();
    let mut entries = Vec::with_capacity(rows.len() * degree);
    for (index, row) in rows.iter().enumerate() {
        if row.len() > degree {
            return Err(MeshError::DegreeOverflow {
                field,
                index,
                degree,
            });
        }
        entries.extend(row.iter().map(|&i| Some(i)));
        entries.extend(std::iter::repeat_n(None, degree - row.len()));
    }
    Connectivity::new(field, entries)
}
