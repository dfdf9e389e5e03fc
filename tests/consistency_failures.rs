mod util;
use icogrid::algs::consistency::{
    ConsistencyCheck, check_cell2cell, check_cell2vertex, check_topology, check_vertex2cell,
    verify_topology,
};
use icogrid::mesh_error::{ErrorKind, MeshError};
use icogrid::topology::connectivity::TableField;
use util::*;

#[test]
fn each_check_passes_on_the_patch() {
    let mesh = hex_patch();
    check_cell2cell(&mesh).unwrap();
    check_cell2vertex(&mesh).unwrap();
    check_vertex2cell(&mesh).unwrap();
    verify_topology(&mesh).unwrap();
}

#[test]
fn wrong_neighbor_is_reported_as_false() {
    let mut mesh = hex_patch();
    // cell 5 claims cell 10 instead of cell 3
    let row = mesh.neighbor_cell_index.row(4).to_vec();
    let slot = row.iter().position(|&c| c == Some(2)).unwrap();
    mesh.neighbor_cell_index.entries_mut()[4 * 3 + slot] = Some(9);
    assert!(!check_topology(&mesh).unwrap());
    let err = check_cell2cell(&mesh).unwrap_err();
    match err {
        MeshError::TopologyMismatch {
            check,
            index,
            derived,
            expected,
        } => {
            assert_eq!(check, ConsistencyCheck::CellToCell);
            assert_eq!(index, 4);
            assert_eq!(derived, vec![Some(1), Some(2), Some(6)]);
            assert_eq!(expected, vec![Some(1), Some(6), Some(9)]);
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn missing_vertex_edge_breaks_vertex2cell() {
    let mut mesh = hex_patch();
    // vertex 5 is interior: six cells, six edges
    mesh.edges_of_vertex.entries_mut()[4 * 6] = None;
    assert!(!check_topology(&mesh).unwrap());
    let err = check_vertex2cell(&mesh).unwrap_err();
    assert!(matches!(
        err,
        MeshError::TopologyMismatch {
            check: ConsistencyCheck::VertexToCell,
            index: 4,
            ..
        }
    ));
}

#[test]
fn wrong_edge_endpoint_breaks_cell2vertex() {
    let mut mesh = hex_patch();
    let e = mesh.edge_of_cell.row(0)[0].unwrap();
    // move one endpoint of an edge of cell 1 to vertex 10
    mesh.edge_vertices.entries_mut()[e * 2] = Some(9);
    let err = verify_topology(&mesh).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TopologyMismatch);
    assert!(!check_topology(&mesh).unwrap());
    assert!(check_cell2vertex(&mesh).is_err());
}

#[test]
fn structural_faults_are_errors() {
    let mut mesh = hex_patch();
    mesh.vertices_of_vertex.entries_mut()[2 * 6] = Some(2);
    assert_eq!(
        check_topology(&mesh).unwrap_err(),
        MeshError::SelfReference {
            field: TableField::VerticesOfVertex,
            index: 2
        }
    );

    let mut mesh = hex_patch();
    mesh.edge_of_cell.entries_mut()[9 * 3 + 2] = None;
    assert_eq!(
        check_topology(&mesh).unwrap_err(),
        MeshError::MissingEdge { cell: 9, slot: 2 }
    );

    let mut mesh = hex_patch();
    mesh.adjacent_cell_of_edge.entries_mut()[1] = Some(10);
    let err = check_topology(&mesh).unwrap_err();
    assert!(matches!(
        err,
        MeshError::IndexOutOfRange {
            field: TableField::AdjacentCellOfEdge,
            index: 0,
            value: 10,
            count: 10
        }
    ));
}
