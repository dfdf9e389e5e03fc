//! Grid-file interchange form of a [`Mesh`].
//!
//! [`RawMesh`] mirrors the variables of a grid file: coordinate arrays named
//! `clon`/`clat`/`elon`/`elat`/`vlon`/`vlat` and connectivity tables stored
//! degree-major (`[degree][count]`) with 1-based indices and `-1` for "no
//! neighbor". Converting to a [`Mesh`] decodes every entry and validates the
//! result; converting back re-encodes.

use serde::{Deserialize, Serialize};

use crate::data::dataset::Dataset;
use crate::mesh_error::MeshError;
use crate::topology::connectivity::{Connectivity, TableField};
use crate::topology::mesh::{Coordinates, Mesh};

/// Serializable grid in file layout.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMesh {
    pub clon: Vec<f64>,
    pub clat: Vec<f64>,
    pub elon: Vec<f64>,
    pub elat: Vec<f64>,
    pub vlon: Vec<f64>,
    pub vlat: Vec<f64>,
    pub edge_of_cell: Vec<Vec<i64>>,
    pub vertex_of_cell: Vec<Vec<i64>>,
    pub adjacent_cell_of_edge: Vec<Vec<i64>>,
    pub edge_vertices: Vec<Vec<i64>>,
    pub cells_of_vertex: Vec<Vec<i64>>,
    pub edges_of_vertex: Vec<Vec<i64>>,
    pub vertices_of_vertex: Vec<Vec<i64>>,
    pub neighbor_cell_index: Vec<Vec<i64>>,
    #[serde(default)]
    pub attributes: Dataset,
}

impl RawMesh {
    /// Raw table for `field`.
    pub fn table(&self, field: TableField) -> &[Vec<i64>] {
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

    fn table_mut(&mut self, field: TableField) -> &mut Vec<Vec<i64>> {
        match field {
            TableField::EdgeOfCell => &mut self.edge_of_cell,
            TableField::VertexOfCell => &mut self.vertex_of_cell,
            TableField::AdjacentCellOfEdge => &mut self.adjacent_cell_of_edge,
            TableField::EdgeVertices => &mut self.edge_vertices,
            TableField::CellsOfVertex => &mut self.cells_of_vertex,
            TableField::EdgesOfVertex => &mut self.edges_of_vertex,
            TableField::VerticesOfVertex => &mut self.vertices_of_vertex,
            TableField::NeighborCellIndex => &mut self.neighbor_cell_index,
        }
    }
}

impl TryFrom<RawMesh> for Mesh {
    type Error = MeshError;

    fn try_from(raw: RawMesh) -> Result<Self, Self::Error> {
        let tables = TableField::ALL
            .into_iter()
            .map(|field| Connectivity::from_raw_degree_major(field, raw.table(field)))
            .collect::<Result<Vec<_>, _>>()?;
        Mesh::new(
            Coordinates::new(raw.clon, raw.clat),
            Coordinates::new(raw.elon, raw.elat),
            Coordinates::new(raw.vlon, raw.vlat),
            tables,
            raw.attributes,
        )
    }
}

impl From<&Mesh> for RawMesh {
    fn from(mesh: &Mesh) -> Self {
        let mut raw = RawMesh {
            clon: mesh.cells.lon.clone(),
            clat: mesh.cells.lat.clone(),
            elon: mesh.edges.lon.clone(),
            elat: mesh.edges.lat.clone(),
            vlon: mesh.vertices.lon.clone(),
            vlat: mesh.vertices.lat.clone(),
            attributes: mesh.attributes.clone(),
            ..RawMesh::default()
        };
        for field in TableField::ALL {
            *raw.table_mut(field) = mesh.table(field).to_raw_degree_major();
        }
        raw
    }
}
