//! Fixed-degree connectivity tables.
//!
//! A [`Connectivity`] maps every element of a source kind to exactly
//! `degree` entries of a target kind. Storage is a flat, element-major buffer
//! (`entries[i * degree .. (i + 1) * degree]` is row `i`).

use std::fmt;

use crate::mesh_error::MeshError;
use crate::topology::location::Location;
use crate::topology::neighbor::{NeighborRef, decode_raw, encode_raw};

/// The eight connectivity tables of a triangular grid.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableField {
    EdgeOfCell,
    VertexOfCell,
    AdjacentCellOfEdge,
    EdgeVertices,
    CellsOfVertex,
    EdgesOfVertex,
    VerticesOfVertex,
    NeighborCellIndex,
}

impl TableField {
    /// All tables, in the order a crop reindexes them.
    pub const ALL: [TableField; 8] = [
        TableField::EdgeOfCell,
        TableField::VertexOfCell,
        TableField::AdjacentCellOfEdge,
        TableField::EdgeVertices,
        TableField::CellsOfVertex,
        TableField::EdgesOfVertex,
        TableField::VerticesOfVertex,
        TableField::NeighborCellIndex,
    ];

    /// Variable name in grid files.
    pub fn name(self) -> &'static str {
        match self {
            TableField::EdgeOfCell => "edge_of_cell",
            TableField::VertexOfCell => "vertex_of_cell",
            TableField::AdjacentCellOfEdge => "adjacent_cell_of_edge",
            TableField::EdgeVertices => "edge_vertices",
            TableField::CellsOfVertex => "cells_of_vertex",
            TableField::EdgesOfVertex => "edges_of_vertex",
            TableField::VerticesOfVertex => "vertices_of_vertex",
            TableField::NeighborCellIndex => "neighbor_cell_index",
        }
    }

    /// Kind of element owning each row.
    pub fn source(self) -> Location {
        match self {
            TableField::EdgeOfCell | TableField::VertexOfCell | TableField::NeighborCellIndex => {
                Location::Cell
            }
            TableField::AdjacentCellOfEdge | TableField::EdgeVertices => Location::Edge,
            TableField::CellsOfVertex
            | TableField::EdgesOfVertex
            | TableField::VerticesOfVertex => Location::Vertex,
        }
    }

    /// Kind of element the entries index into.
    pub fn target(self) -> Location {
        match self {
            TableField::EdgeOfCell | TableField::EdgesOfVertex => Location::Edge,
            TableField::VertexOfCell | TableField::EdgeVertices | TableField::VerticesOfVertex => {
                Location::Vertex
            }
            TableField::AdjacentCellOfEdge
            | TableField::CellsOfVertex
            | TableField::NeighborCellIndex => Location::Cell,
        }
    }

    /// Fixed number of entries per row.
    pub fn degree(self) -> usize {
        match self.source() {
            Location::Cell => 3,
            Location::Edge => 2,
            Location::Vertex => 6,
        }
    }

    /// Whether source and target are the same kind, so a row may not list its
    /// own element.
    pub fn is_self_adjacency(self) -> bool {
        self.source() == self.target()
    }

    /// Whether every element of the target kind is referenced by some row
    /// whenever the mesh is a union of whole triangles.
    ///
    /// Holds for all tables except `neighbor_cell_index`: an isolated cell has
    /// no neighboring cell at all.
    pub fn covers_target(self) -> bool {
        self != TableField::NeighborCellIndex
    }

    /// Look a table up by its grid-file variable name.
    pub fn from_name(name: &str) -> Option<Self> {
        TableField::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for TableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fixed-degree table of [`NeighborRef`] entries for one [`TableField`].
#[derive(Clone, Debug, PartialEq)]
pub struct Connectivity {
    field: TableField,
    entries: Vec<NeighborRef>,
}

impl Connectivity {
    /// Build a table from flat element-major entries.
    pub fn new(field: TableField, entries: Vec<NeighborRef>) -> Result<Self, MeshError> {
        if entries.len() % field.degree() != 0 {
            return Err(MeshError::LengthMismatch {
                what: format!("{field} entries (degree {})", field.degree()),
                expected: entries.len().next_multiple_of(field.degree()),
                found: entries.len(),
            });
        }
        Ok(Self { field, entries })
    }

    /// A table of `rows` rows with every entry `None`.
    pub fn empty(field: TableField, rows: usize) -> Self {
        Self {
            field,
            entries: vec![None; rows * field.degree()],
        }
    }

    /// Build a table from per-row arrays of `NeighborRef`.
    pub fn from_rows<const D: usize>(
        field: TableField,
        rows: &[[NeighborRef; D]],
    ) -> Result<Self, MeshError> {
        if D != field.degree() {
            return Err(MeshError::LengthMismatch {
                what: format!("{field} row width"),
                expected: field.degree(),
                found: D,
            });
        }
        Ok(Self {
            field,
            entries: rows.iter().flatten().copied().collect(),
        })
    }

    /// Decode a raw degree-major (`[degree][count]`, 1-based, `-1` sentinel)
    /// table as stored in grid files.
    pub fn from_raw_degree_major(field: TableField, raw: &[Vec<i64>]) -> Result<Self, MeshError> {
        let degree = field.degree();
        if raw.len() != degree {
            return Err(MeshError::LengthMismatch {
                what: format!("{field} leading dimension"),
                expected: degree,
                found: raw.len(),
            });
        }
        let rows = raw[0].len();
        for column in raw {
            if column.len() != rows {
                return Err(MeshError::LengthMismatch {
                    what: format!("{field} trailing dimension"),
                    expected: rows,
                    found: column.len(),
                });
            }
        }
        let mut entries = Vec::with_capacity(rows * degree);
        for i in 0..rows {
            for column in raw {
                entries.push(decode_raw(field, i, column[i])?);
            }
        }
        Ok(Self { field, entries })
    }

    /// Encode as a raw degree-major table (inverse of
    /// [`from_raw_degree_major`](Self::from_raw_degree_major)).
    pub fn to_raw_degree_major(&self) -> Vec<Vec<i64>> {
        let degree = self.degree();
        (0..degree)
            .map(|slot| {
                self.entries
                    .iter()
                    .skip(slot)
                    .step_by(degree)
                    .map(|&e| encode_raw(e))
                    .collect()
            })
            .collect()
    }

    pub fn field(&self) -> TableField {
        self.field
    }

    pub fn degree(&self) -> usize {
        self.field.degree()
    }

    /// Number of rows (source elements).
    pub fn len(&self) -> usize {
        self.entries.len() / self.degree()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Row `i`, or `None` when out of range.
    pub fn get(&self, i: usize) -> Option<&[NeighborRef]> {
        let d = self.degree();
        self.entries.get(i * d..(i + 1) * d)
    }

    /// Row `i`.
    ///
    /// # Panics
    /// Panics if `i >= self.len()`.
    pub fn row(&self, i: usize) -> &[NeighborRef] {
        let d = self.degree();
        &self.entries[i * d..(i + 1) * d]
    }

    /// Iterate over rows in element order.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, NeighborRef> {
        self.entries.chunks_exact(self.degree())
    }

    /// Flat element-major entries.
    pub fn entries(&self) -> &[NeighborRef] {
        &self.entries
    }

    /// Mutable flat element-major entries.
    pub fn entries_mut(&mut self) -> &mut [NeighborRef] {
        &mut self.entries
    }

    /// Largest `Some` index in the table.
    pub fn max_index(&self) -> Option<usize> {
        self.entries.iter().flatten().copied().max()
    }

    /// Keep only the rows listed in `rows`, in that order. Entries are copied
    /// verbatim, so they still refer to the original index space.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        let d = self.degree();
        let mut entries = Vec::with_capacity(rows.len() * d);
        for &r in rows {
            entries.extend_from_slice(&self.entries[r * d..(r + 1) * d]);
        }
        Self {
            field: self.field,
            entries,
        }
    }
}
