//! The triangular grid: coordinates and connectivity of cells, edges and
//! vertices.

use crate::data::dataset::Dataset;
use crate::debug_invariants::DebugInvariants;
use crate::geometry::bounds::LonLatBox;
use crate::mesh_error::MeshError;
use crate::topology::connectivity::{Connectivity, TableField};
use crate::topology::location::Location;
use crate::topology::validation::validate_mesh_structure;

/// Lon/lat coordinates (radians) of all elements of one kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Coordinates {
    pub lon: Vec<f64>,
    pub lat: Vec<f64>,
}

impl Coordinates {
    pub fn new(lon: Vec<f64>, lat: Vec<f64>) -> Self {
        Self { lon, lat }
    }

    /// Number of elements (the longitude count; see
    /// [`validate_mesh_structure`] for the length check).
    pub fn len(&self) -> usize {
        self.lon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lon.is_empty()
    }

    /// Coordinate of element `i` as `(lon, lat)`.
    #[inline]
    pub fn get(&self, i: usize) -> Option<(f64, f64)> {
        Some((*self.lon.get(i)?, *self.lat.get(i)?))
    }

    /// Tight bounding box, `None` when empty or not finite.
    pub fn bounds(&self) -> Option<LonLatBox> {
        LonLatBox::from_coords(&self.lon, &self.lat)
    }

    /// Keep only the elements listed in `keep`, in that order.
    pub fn select(&self, keep: &[usize]) -> Self {
        Self {
            lon: keep.iter().map(|&i| self.lon[i]).collect(),
            lat: keep.iter().map(|&i| self.lat[i]).collect(),
        }
    }
}

/// A triangular grid with fixed-degree connectivity.
///
/// Fields are public; [`validate_mesh_structure`] (or
/// [`DebugInvariants::validate_invariants`]) checks that they agree.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub cells: Coordinates,
    pub edges: Coordinates,
    pub vertices: Coordinates,
    pub edge_of_cell: Connectivity,
    pub vertex_of_cell: Connectivity,
    pub adjacent_cell_of_edge: Connectivity,
    pub edge_vertices: Connectivity,
    pub cells_of_vertex: Connectivity,
    pub edges_of_vertex: Connectivity,
    pub vertices_of_vertex: Connectivity,
    pub neighbor_cell_index: Connectivity,
    /// Additional per-element grid variables (areas, lengths, ...).
    pub attributes: Dataset,
}

impl Mesh {
    /// Assemble a mesh from coordinates and tables, validating the result.
    ///
    /// `tables` must hold each [`TableField`] exactly once, in any order.
    pub fn new(
        cells: Coordinates,
        edges: Coordinates,
        vertices: Coordinates,
        tables: Vec<Connectivity>,
        attributes: Dataset,
    ) -> Result<Self, MeshError> {
        let mut slots: [Option<Connectivity>; 8] = Default::default();
        for table in tables {
            let pos = slot_of(table.field());
            slots[pos] = Some(table);
        }
        let mut take = |field: TableField| {
            slots[slot_of(field)]
                .take()
                .ok_or_else(|| MeshError::LengthMismatch {
                    what: format!("{field} table"),
                    expected: 1,
                    found: 0,
                })
        };
        let mesh = Mesh {
            edge_of_cell: take(TableField::EdgeOfCell)?,
            vertex_of_cell: take(TableField::VertexOfCell)?,
            adjacent_cell_of_edge: take(TableField::AdjacentCellOfEdge)?,
            edge_vertices: take(TableField::EdgeVertices)?,
            cells_of_vertex: take(TableField::CellsOfVertex)?,
            edges_of_vertex: take(TableField::EdgesOfVertex)?,
            vertices_of_vertex: take(TableField::VerticesOfVertex)?,
            neighbor_cell_index: take(TableField::NeighborCellIndex)?,
            cells,
            edges,
            vertices,
            attributes,
        };
        validate_mesh_structure(&mesh)?;
        Ok(mesh)
    }

    /// Number of elements of `location`.
    pub fn count(&self, location: Location) -> usize {
        self.coords(location).len()
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Coordinates of `location`.
    pub fn coords(&self, location: Location) -> &Coordinates {
        match location {
            Location::Cell => &self.cells,
            Location::Edge => &self.edges,
            Location::Vertex => &self.vertices,
        }
    }

    /// The table for `field`.
    pub fn table(&self, field: TableField) -> &Connectivity {
        match field {
            TableField::EdgeOfCell => &self.edge_of_cell,
            TableField::VertexOfCell => &self.vertex_of_cell,
            TableField::AdjacentCellOfEdge => &self.adjacent_cell_of_edge,
            TableField::EdgeVertices => &self.edge_vertices,
            TableField::CellsOfVertex => &self.cells_of_vertex,
            TableField::EdgesOfVertex => &self.edges_of_vertex,
            TableField::VerticesOfVertex => &self.vertices_of_vertex,
            TableField::NeighborCellIndex => &self.neighbor_cell_index,
        }
    }
}

fn slot_of(field: TableField) -> usize {
    TableField::ALL
        .iter()
        .position(|&f| f == field)
        .unwrap_or_default()
}

impl DebugInvariants for Mesh {
    fn validate_invariants(&self) -> Result<(), MeshError> {
        validate_mesh_structure(self)
    }
}
