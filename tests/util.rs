#![allow(dead_code)]
use icogrid::algs::meshgen::ROW_HEIGHT;
use icogrid::topology::builder::mesh_from_triangles;
use icogrid::topology::mesh::Mesh;
use icogrid::topology::neighbor::NeighborRef;

/// Lon/lat origin and scale of the hexagonal patch, radians.
pub const PATCH_ORIGIN: [f64; 2] = [0.15, 0.87];
pub const PATCH_SCALE: f64 = 0.001;

/// Ten triangles around vertex 5 and its neighbors (vertex and cell numbers
/// are 1-based, as in grid files):
///
/// ```text
///        8 ----- 9 ---- 10
///       / \  8  / \  9  / \
///      / 6 \   / 7 \   / 10\
///     4 --- 5 ----- 6 ----- 7
///      \ 1 / \  5  / \  4  /
///       \ /  2\   / 3 \   /
///        1 ----- 2 ----- 3
/// ```
pub fn hex_patch() -> Mesh {
    let s = ROW_HEIGHT;
    let units: [(f64, f64); 10] = [
        (0.0, 0.0),
        (1.0, 0.0),
        (2.0, 0.0),
        (-0.5, s),
        (0.5, s),
        (1.5, s),
        (2.5, s),
        (0.0, 2.0 * s),
        (1.0, 2.0 * s),
        (2.0, 2.0 * s),
    ];
    let cells_1based: [[usize; 3]; 10] = [
        [4, 1, 5],
        [1, 2, 5],
        [2, 3, 6],
        [6, 3, 7],
        [5, 2, 6],
        [4, 5, 8],
        [5, 6, 9],
        [8, 5, 9],
        [9, 6, 10],
        [6, 7, 10],
    ];
    let (vlon, vlat) = to_lonlat(&units);
    let triangles: Vec<[usize; 3]> = cells_1based
        .iter()
        .map(|t| [t[0] - 1, t[1] - 1, t[2] - 1])
        .collect();
    mesh_from_triangles(vlon, vlat, &triangles).unwrap()
}

/// Patch units to radians.
pub fn to_lonlat(units: &[(f64, f64)]) -> (Vec<f64>, Vec<f64>) {
    (
        units
            .iter()
            .map(|&(x, _)| PATCH_ORIGIN[0] + x * PATCH_SCALE)
            .collect(),
        units
            .iter()
            .map(|&(_, y)| PATCH_ORIGIN[1] + y * PATCH_SCALE)
            .collect(),
    )
}

/// Box in patch units to radian bounds.
pub fn patch_box(x: [f64; 2], y: [f64; 2]) -> ([f64; 2], [f64; 2]) {
    (
        [
            PATCH_ORIGIN[0] + x[0] * PATCH_SCALE,
            PATCH_ORIGIN[0] + x[1] * PATCH_SCALE,
        ],
        [
            PATCH_ORIGIN[1] + y[0] * PATCH_SCALE,
            PATCH_ORIGIN[1] + y[1] * PATCH_SCALE,
        ],
    )
}

/// Row converted to 1-based raw entries, sorted.
pub fn raw_sorted(row: &[NeighborRef]) -> Vec<i64> {
    let mut v: Vec<i64> = row
        .iter()
        .map(|e| e.map_or(-1, |i| i as i64 + 1))
        .collect();
    v.sort_unstable();
    v
}
