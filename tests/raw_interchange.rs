mod util;
use icogrid::algs::crop::{CropOptions, CropRegion, RegionCropper, crop};
use icogrid::algs::meshgen::triangular_lattice;
use icogrid::mesh_error::{ErrorKind, MeshError};
use icogrid::topology::connectivity::TableField;
use icogrid::topology::mesh::Mesh;
use icogrid::topology::raw::RawMesh;
use util::*;

#[test]
fn raw_mesh_json_round_trip() {
    let mesh = hex_patch();
    let raw = RawMesh::from(&mesh);
    let json = serde_json::to_string(&raw).unwrap();
    let back: RawMesh = serde_json::from_str(&json).unwrap();
    assert_eq!(back, raw);
    assert_eq!(Mesh::try_from(back).unwrap(), mesh);
}

#[test]
fn raw_tables_are_one_based_and_degree_major() {
    let mesh = hex_patch();
    let raw = RawMesh::from(&mesh);
    // vertex_of_cell is stored as (nv=3, cell=10)
    assert_eq!(raw.vertex_of_cell.len(), 3);
    assert_eq!(raw.vertex_of_cell[0].len(), 10);
    assert_eq!(
        [
            raw.vertex_of_cell[0][1],
            raw.vertex_of_cell[1][1],
            raw.vertex_of_cell[2][1]
        ],
        [1, 2, 5]
    );
    // cell 1 sits on the boundary
    let column: Vec<i64> = (0..3).map(|k| raw.neighbor_cell_index[k][0]).collect();
    assert!(column.contains(&-1));
    assert!(raw.edge_of_cell.iter().flatten().all(|&e| e >= 1));
}

#[test]
fn cropped_grid_exports_with_sentinels() {
    let mesh = hex_patch();
    let (lon, lat) = patch_box([0.4, 1.1], [0.2, 1.2]);
    let cropped = crop(&mesh, lon, lat).unwrap();
    let raw = RawMesh::from(&cropped.mesh);
    for field in TableField::ALL {
        let table = raw.table(field);
        assert_eq!(table.len(), field.degree());
        let max = table.iter().flatten().copied().max().unwrap();
        assert!(table.iter().flatten().all(|&v| v == -1 || v >= 1));
        if field.covers_target() {
            assert_eq!(max as usize, cropped.mesh.count(field.target()), "{field}");
        }
    }
}

#[test]
fn invalid_raw_entries_are_rejected() {
    let mesh = hex_patch();

    let mut raw = RawMesh::from(&mesh);
    raw.cells_of_vertex[5][3] = -2;
    assert_eq!(
        Mesh::try_from(raw).unwrap_err(),
        MeshError::InvalidRawIndex {
            field: TableField::CellsOfVertex,
            index: 3,
            raw: -2
        }
    );

    let mut raw = RawMesh::from(&mesh);
    raw.edge_vertices.pop();
    let err = Mesh::try_from(raw).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedMesh);

    let mut raw = RawMesh::from(&mesh);
    raw.clat.pop();
    assert!(matches!(
        Mesh::try_from(raw).unwrap_err(),
        MeshError::LengthMismatch { expected: 10, found: 9, .. }
    ));
}

#[test]
fn options_and_regions_from_json() {
    let options: CropOptions = serde_json::from_str(r#"{ "occupancy": 0.25 }"#).unwrap();
    assert_eq!(options.occupancy, 0.25);
    assert!(options.validate_source);
    assert!(!options.verify_topology);

    let region: CropRegion =
        serde_json::from_str(r#"{ "kind": "degrees", "lon": [8.6, 8.7], "lat": [49.8, 49.9] }"#)
            .unwrap();
    assert_eq!(
        region,
        CropRegion::Degrees {
            lon: [8.6, 8.7],
            lat: [49.8, 49.9]
        }
    );

    let region: CropRegion = serde_json::from_str(r#"{ "kind": "scale", "scale": 0.2 }"#).unwrap();
    let mesh = triangular_lattice(12, 10, [0.15, 0.87], 0.001).unwrap();
    let options = CropOptions {
        verify_topology: true,
        ..options
    };
    let cropper = RegionCropper::from_region(&mesh, &region, options).unwrap();
    assert!(!cropper.subset().cells.is_empty());
    cropper.crop_grid().unwrap();

    let json = serde_json::to_string(&CropOptions::default()).unwrap();
    let back: CropOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(back, CropOptions::default());
}
