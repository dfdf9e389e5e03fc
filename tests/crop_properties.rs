use icogrid::algs::consistency::check_topology;
use icogrid::algs::crop::{CroppedMesh, crop};
use icogrid::algs::meshgen::{ROW_HEIGHT, triangular_lattice};
use icogrid::topology::connectivity::TableField;
use icogrid::topology::location::Location;
use icogrid::topology::mesh::Mesh;
use icogrid::topology::validation::validate_mesh_structure;
use proptest::prelude::*;

const H: f64 = 0.002;
const ORIGIN: [f64; 2] = [0.05, 0.75];

fn source() -> Mesh {
    triangular_lattice(16, 12, ORIGIN, H).unwrap()
}

/// Crop boxes in lattice units: at least six sides wide and six rows tall,
/// always inside the 16 x 12 patch.
fn lattice_box() -> impl Strategy<Value = ([f64; 2], [f64; 2])> {
    (0.2f64..8.0, 6.0f64..8.0, 0.1f64..3.0, 6.0f64..7.0).prop_map(|(x0, w, y0, h)| {
        let h = h * ROW_HEIGHT;
        (
            [ORIGIN[0] + x0 * H, ORIGIN[0] + (x0 + w) * H],
            [ORIGIN[1] + y0 * H, ORIGIN[1] + (y0 + h) * H],
        )
    })
}

fn cropped(mesh: &Mesh, b: &([f64; 2], [f64; 2])) -> CroppedMesh {
    crop(mesh, b.0, b.1).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn retained_cells_are_exactly_those_inside(b in lattice_box()) {
        let mesh = source();
        let out = cropped(&mesh, &b);
        let inside: Vec<usize> = (0..mesh.num_cells())
            .filter(|&i| out.region.contains_open(mesh.cells.lon[i], mesh.cells.lat[i]))
            .collect();
        prop_assert_eq!(&out.subset.cells, &inside);
        for (new, &old) in out.subset.cells.iter().enumerate() {
            prop_assert_eq!(out.mesh.cells.get(new), mesh.cells.get(old));
        }
    }

    #[test]
    fn cropped_topology_closes(b in lattice_box()) {
        let mesh = source();
        let out = cropped(&mesh, &b);
        prop_assert!(check_topology(&out.mesh).unwrap());
    }

    #[test]
    fn degrees_and_ranges_hold(b in lattice_box()) {
        let mesh = source();
        let out = cropped(&mesh, &b);
        prop_assert!(validate_mesh_structure(&out.mesh).is_ok());
        for field in TableField::ALL {
            let table = out.mesh.table(field);
            prop_assert_eq!(table.len(), out.mesh.count(field.source()));
            prop_assert_eq!(table.entries().len(), table.len() * field.degree());
        }
        for row in out.mesh.cells_of_vertex.rows() {
            prop_assert!(row.iter().flatten().count() <= 6);
        }
    }

    #[test]
    fn references_to_dropped_elements_become_none(b in lattice_box()) {
        let mesh = source();
        let out = cropped(&mesh, &b);
        for field in TableField::ALL {
            let before = mesh.table(field);
            let after = out.mesh.table(field);
            for (new_row, &old_row) in out.subset.get(field.source()).iter().enumerate() {
                for (slot, entry) in before.row(old_row).iter().enumerate() {
                    let expected = entry.and_then(|t| out.subset.position(field.target(), t));
                    prop_assert_eq!(after.row(new_row)[slot], expected, "{} row {}", field, new_row);
                }
            }
        }
    }

    #[test]
    fn retained_edges_and_vertices_stay_near_the_box(b in lattice_box()) {
        let mesh = source();
        let out = cropped(&mesh, &b);
        // a vertex lies within side / sqrt(3) of its cell's center
        let near = out.region.expanded(H);
        for loc in [Location::Edge, Location::Vertex] {
            let coords = out.mesh.coords(loc);
            for (i, (&x, &y)) in coords.lon.iter().zip(&coords.lat).enumerate() {
                prop_assert!(near.contains_closed(x, y), "{} {} at ({}, {})", loc, i, x, y);
            }
        }
    }
}
