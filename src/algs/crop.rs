//! Crop a mesh to a lon/lat box.
//!
//! A crop keeps every cell whose center lies strictly inside the box, plus all
//! edges and vertices of those cells, so the result is made of whole
//! triangles. Some retained edges and vertices may therefore lie outside the
//! box. Coordinates, table rows and attributes are sliced in original order,
//! then every table is re-expressed in the compact index space: each
//! referenced element is located by hashing its coordinate into a bucket grid
//! built over the *cropped* coordinates. References to elements that were
//! dropped become `None`.
//!
//! ```
//! use icogrid::algs::crop::crop;
//! use icogrid::algs::meshgen::triangular_lattice;
//!
//! let mesh = triangular_lattice(16, 12, [0.10, 0.80], 0.001).unwrap();
//! let cropped = crop(&mesh, [0.1022, 0.1095], [0.8011, 0.8069]).unwrap();
//! assert!(cropped.mesh.num_cells() < mesh.num_cells());
//! assert!(icogrid::algs::consistency::check_topology(&cropped.mesh).unwrap());
//! ```

use log::{debug, info, warn};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use static_assertions::assert_impl_all;

use crate::algs::consistency::verify_topology;
use crate::algs::spatial_hash::{BucketGrid, DEFAULT_OCCUPANCY, Lookup, check_occupancy};
use crate::data::dataset::Dataset;
use crate::data::field::Field;
use crate::debug_invariants::DebugInvariants;
use crate::geometry::bounds::LonLatBox;
use crate::mesh_error::MeshError;
use crate::topology::connectivity::{Connectivity, TableField};
use crate::topology::location::Location;
use crate::topology::mesh::{Coordinates, Mesh};
use crate::topology::neighbor::NeighborRef;
use crate::topology::validation::{
    MeshValidationOptions, validate_mesh_structure, validate_mesh_with,
};

/// Tuning and safety switches for a crop.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropOptions {
    /// Expected fraction of occupied buckets in the reindexing hash grids.
    pub occupancy: f64,
    /// Run [`verify_topology`] on the cropped mesh.
    pub verify_topology: bool,
    /// Validate the structure of the source mesh before selecting. When
    /// off, the cropped mesh is validated instead and defects are returned.
    pub validate_source: bool,
}

impl Default for CropOptions {
    fn default() -> Self {
        Self {
            occupancy: DEFAULT_OCCUPANCY,
            verify_topology: false,
            validate_source: true,
        }
    }
}

impl CropOptions {
    pub fn validate(&self) -> Result<(), MeshError> {
        check_occupancy(self.occupancy)
    }
}

/// Ways to name the region of interest.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CropRegion {
    /// Bounds in radians.
    Radians { lon: [f64; 2], lat: [f64; 2] },
    /// Bounds in degrees.
    Degrees { lon: [f64; 2], lat: [f64; 2] },
    /// The mesh's own cell extent shrunk about its center: each side moves
    /// inward by `extent · scale / 2`.
    Scale { scale: f64 },
}

impl CropRegion {
    /// The box in radians for `mesh`.
    pub fn resolve(&self, mesh: &Mesh) -> Result<LonLatBox, MeshError> {
        match *self {
            CropRegion::Radians { lon, lat } => LonLatBox::new(lon, lat),
            CropRegion::Degrees { lon, lat } => LonLatBox::from_degrees(lon, lat),
            CropRegion::Scale { scale } => {
                let domain = mesh.cell_bounds().ok_or(MeshError::DegenerateExtent {
                    location: Location::Cell,
                    count: mesh.num_cells(),
                    lon_extent: f64::NAN,
                    lat_extent: f64::NAN,
                })?;
                domain.shrink(scale)
            }
        }
    }
}

/// Sorted original indices of the retained elements, per kind.
///
/// Position `k` in a list is the element's index in the cropped mesh.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSubset {
    pub cells: Vec<usize>,
    pub edges: Vec<usize>,
    pub vertices: Vec<usize>,
}

assert_impl_all!(IndexSubset: Send, Sync);

impl IndexSubset {
    pub fn get(&self, location: Location) -> &[usize] {
        match location {
            Location::Cell => &self.cells,
            Location::Edge => &self.edges,
            Location::Vertex => &self.vertices,
        }
    }

    pub fn len(&self, location: Location) -> usize {
        self.get(location).len()
    }

    /// New index of original element `original`, if it was retained.
    pub fn position(&self, location: Location, original: usize) -> Option<usize> {
        self.get(location).binary_search(&original).ok()
    }
}

/// A cropped mesh together with the mapping back to its source.
#[derive(Clone, Debug, PartialEq)]
pub struct CroppedMesh {
    pub mesh: Mesh,
    pub subset: IndexSubset,
    pub region: LonLatBox,
    source_counts: [usize; 3],
}

impl CroppedMesh {
    /// Element count of `location` in the source mesh.
    pub fn source_count(&self, location: Location) -> usize {
        self.source_counts[location as usize]
    }

    /// Restrict `field` (defined on the source mesh) to the cropped mesh.
    pub fn apply(&self, field: &Field) -> Result<Field, MeshError> {
        restrict_field(field, &self.subset, &self.source_counts)
    }

    /// Restrict every field of `dataset`.
    pub fn apply_dataset(&self, dataset: &Dataset) -> Result<Dataset, MeshError> {
        restrict_dataset(dataset, &self.subset, &self.source_counts)
    }

    pub fn into_mesh(self) -> Mesh {
        self.mesh
    }
}

/// Selection and reindexing state for one crop of one mesh.
///
/// The source mesh is only borrowed; nothing in it is modified.
#[derive(Debug)]
pub struct RegionCropper<'a> {
    mesh: &'a Mesh,
    region: LonLatBox,
    options: CropOptions,
    subset: IndexSubset,
}

impl<'a> RegionCropper<'a> {
    /// Select the cells of `mesh` inside the open box `lon × lat` (radians).
    pub fn new(mesh: &'a Mesh, lon: [f64; 2], lat: [f64; 2]) -> Result<Self, MeshError> {
        Self::with_options(mesh, lon, lat, CropOptions::default())
    }

    pub fn with_options(
        mesh: &'a Mesh,
        lon: [f64; 2],
        lat: [f64; 2],
        options: CropOptions,
    ) -> Result<Self, MeshError> {
        options.validate()?;
        let region = LonLatBox::new(lon, lat)?;
        Self::select(mesh, region, options)
    }

    pub fn from_region(
        mesh: &'a Mesh,
        region: &CropRegion,
        options: CropOptions,
    ) -> Result<Self, MeshError> {
        options.validate()?;
        let region = region.resolve(mesh)?;
        Self::select(mesh, region, options)
    }

    fn select(mesh: &'a Mesh, region: LonLatBox, options: CropOptions) -> Result<Self, MeshError> {
        if options.validate_source {
            validate_mesh_structure(mesh)?;
        } else {
            // row and coordinate counts are still needed for slicing
            validate_mesh_with(
                mesh,
                MeshValidationOptions {
                    check_shapes: true,
                    check_ranges: false,
                    check_self_references: false,
                    check_cell_edges: false,
                    check_attributes: false,
                },
            )?;
        }
        let domain = mesh
            .cell_bounds()
            .ok_or(MeshError::EmptySelection { requested: region })?;
        if !region.intersects(&domain) {
            return Err(MeshError::DomainBounds {
                requested: region,
                domain,
            });
        }

        let cells = cells_inside(&mesh.cells, &region);
        if cells.is_empty() {
            return Err(MeshError::EmptySelection { requested: region });
        }
        let edges = closure(&mesh.edge_of_cell, &cells, mesh.num_edges())?;
        let vertices = closure(&mesh.vertex_of_cell, &cells, mesh.num_vertices())?;
        debug!(
            "crop selection {region}: {} cells, {} edges, {} vertices",
            cells.len(),
            edges.len(),
            vertices.len()
        );

        Ok(Self {
            mesh,
            region,
            options,
            subset: IndexSubset {
                cells,
                edges,
                vertices,
            },
        })
    }

    pub fn subset(&self) -> &IndexSubset {
        &self.subset
    }

    pub fn region(&self) -> LonLatBox {
        self.region
    }

    pub fn options(&self) -> &CropOptions {
        &self.options
    }

    /// Build the cropped mesh: slice coordinates, rows and attributes, then
    /// reindex all eight tables.
    pub fn crop_grid(&self) -> Result<CroppedMesh, MeshError> {
        let coords = Location::ALL.map(|loc| self.mesh.coords(loc).select(self.subset.get(loc)));
        let [cell_grid, edge_grid, vertex_grid] = [
            self.grid_over(Location::Cell, &coords[0])?,
            self.grid_over(Location::Edge, &coords[1])?,
            self.grid_over(Location::Vertex, &coords[2])?,
        ];
        let grid_for = |loc: Location| match loc {
            Location::Cell => &cell_grid,
            Location::Edge => &edge_grid,
            Location::Vertex => &vertex_grid,
        };
        let mut reindexed = Vec::with_capacity(TableField::ALL.len());
        for field in TableField::ALL {
            reindexed.push(self.reindex_with(field, grid_for(field.target()))?);
        }
        let [
            edge_of_cell,
            vertex_of_cell,
            adjacent_cell_of_edge,
            edge_vertices,
            cells_of_vertex,
            edges_of_vertex,
            vertices_of_vertex,
            neighbor_cell_index,
        ]: [Connectivity; 8] = reindexed
            .try_into()
            .map_err(|_| MeshError::InvalidConfig("table count changed during crop".into()))?;

        let [cells, edges, vertices] = coords;
        let mesh = Mesh {
            cells,
            edges,
            vertices,
            edge_of_cell,
            vertex_of_cell,
            adjacent_cell_of_edge,
            edge_vertices,
            cells_of_vertex,
            edges_of_vertex,
            vertices_of_vertex,
            neighbor_cell_index,
            attributes: self.crop_fields()?,
        };
        if self.options.validate_source {
            mesh.debug_assert_invariants();
        } else {
            // an unchecked source can carry defects into the crop
            mesh.validate_invariants()?;
        }
        if self.options.verify_topology {
            verify_topology(&mesh)?;
        }

        let from = self.mesh.cell_bounds().map(|b| b.to_degrees());
        info!(
            "cropped grid to {} (degrees): {} of {} cells, {} edges, {} vertices; source extent {}",
            self.region.to_degrees(),
            mesh.num_cells(),
            self.mesh.num_cells(),
            mesh.num_edges(),
            mesh.num_vertices(),
            from.map_or_else(|| "empty".to_string(), |b| b.to_string()),
        );

        Ok(CroppedMesh {
            mesh,
            subset: self.subset.clone(),
            region: self.region,
            source_counts: self.source_counts(),
        })
    }

    /// Reindex one table into the cropped index space.
    ///
    /// Builds a hash grid over the cropped coordinates of the table's target
    /// kind; [`crop_grid`](Self::crop_grid) shares one grid per kind instead.
    pub fn reindex_table(&self, field: TableField) -> Result<Connectivity, MeshError> {
        let target = field.target();
        let coords = self.mesh.coords(target).select(self.subset.get(target));
        let grid = self.grid_over(target, &coords)?;
        self.reindex_with(field, &grid)
    }

    /// Restrict a field defined on the source mesh.
    pub fn apply(&self, field: &Field) -> Result<Field, MeshError> {
        restrict_field(field, &self.subset, &self.source_counts())
    }

    /// Restrict every field of a dataset defined on the source mesh.
    pub fn apply_dataset(&self, dataset: &Dataset) -> Result<Dataset, MeshError> {
        restrict_dataset(dataset, &self.subset, &self.source_counts())
    }

    fn crop_fields(&self) -> Result<Dataset, MeshError> {
        self.apply_dataset(&self.mesh.attributes)
    }

    fn source_counts(&self) -> [usize; 3] {
        Location::ALL.map(|loc| self.mesh.count(loc))
    }

    fn grid_over(&self, location: Location, coords: &Coordinates) -> Result<BucketGrid, MeshError> {
        BucketGrid::build(location, &coords.lon, &coords.lat, self.options.occupancy)
    }

    fn reindex_with(&self, field: TableField, grid: &BucketGrid) -> Result<Connectivity, MeshError> {
        let target = field.target();
        let kept = self.subset.get(target);
        let source = self.mesh.coords(target);
        let rows = self
            .mesh
            .table(field)
            .select_rows(self.subset.get(field.source()));

        let remap = |&entry: &NeighborRef| -> Result<NeighborRef, MeshError> {
            let Some(old) = entry else {
                return Ok(None);
            };
            let Ok(pos) = kept.binary_search(&old) else {
                return Ok(None);
            };
            let (lon, lat) = source.get(old).ok_or(MeshError::IndexOutOfRange {
                field,
                index: pos,
                value: old,
                count: source.len(),
            })?;
            match grid.lookup(lon, lat) {
                Lookup::Element(new) if new == pos => Ok(Some(new)),
                found => Err(MeshError::ReindexInvariant {
                    field,
                    reason: format!("{target} {old} hashed to {found:?}, expected position {pos}"),
                }),
            }
        };
        #[cfg(feature = "rayon")]
        let mapped: Vec<Result<NeighborRef, MeshError>> = rows.entries().par_iter().map(remap).collect();
        #[cfg(not(feature = "rayon"))]
        let mapped: Vec<Result<NeighborRef, MeshError>> = rows.entries().iter().map(remap).collect();
        let entries = mapped.into_iter().collect::<Result<Vec<_>, _>>()?;

        let count = kept.len();
        let max = entries.iter().flatten().copied().max();
        if max.is_some_and(|m| m >= count) {
            return Err(MeshError::ReindexInvariant {
                field,
                reason: format!("index {max:?} exceeds {count} retained {target}s"),
            });
        }
        if field.covers_target() && max.map(|m| m + 1) != Some(count) {
            return Err(MeshError::ReindexInvariant {
                field,
                reason: format!(
                    "largest index is {} but {count} {target}s are retained",
                    max.map_or(-1, |m| m as i64)
                ),
            });
        }
        debug!("reindexed {field}: {} rows", entries.len() / field.degree());
        Connectivity::new(field, entries)
    }
}

/// Crop `mesh` to the open box `lon × lat` (radians) with default options.
pub fn crop(mesh: &Mesh, lon: [f64; 2], lat: [f64; 2]) -> Result<CroppedMesh, MeshError> {
    RegionCropper::new(mesh, lon, lat)?.crop_grid()
}

/// Restrict a field of the source mesh to a crop result.
pub fn apply_crop(cropped: &CroppedMesh, field: &Field) -> Result<Field, MeshError> {
    cropped.apply(field)
}

fn cells_inside(cells: &Coordinates, region: &LonLatBox) -> Vec<usize> {
    let inside = |i: &usize| cells.get(*i).is_some_and(|(x, y)| region.contains_open(x, y));
    #[cfg(feature = "rayon")]
    {
        (0..cells.len()).into_par_iter().filter(inside).collect()
    }
    #[cfg(not(feature = "rayon"))]
    {
        (0..cells.len()).filter(inside).collect()
    }
}

/// Sorted, deduplicated `Some` entries of the selected rows.
fn closure(table: &Connectivity, rows: &[usize], target_count: usize) -> Result<Vec<usize>, MeshError> {
    let mut out = Vec::with_capacity(rows.len() * table.degree());
    for &row in rows {
        for &value in table.row(row).iter().flatten() {
            if value >= target_count {
                return Err(MeshError::IndexOutOfRange {
                    field: table.field(),
                    index: row,
                    value,
                    count: target_count,
                });
            }
            out.push(value);
        }
    }
    out.sort_unstable();
    out.dedup();
    Ok(out)
}

fn restrict_field(
    field: &Field,
    subset: &IndexSubset,
    source_counts: &[usize; 3],
) -> Result<Field, MeshError> {
    let mut out = field.clone();
    let mut touched = false;
    for loc in Location::ALL {
        if out.has_location(loc) {
            out = out.restrict(loc, source_counts[loc as usize], subset.get(loc))?;
            touched = true;
        }
    }
    if !touched {
        warn!(
            "field `{}` has no cell, edge or vertex dimension; left unchanged",
            field.name
        );
    }
    Ok(out)
}

fn restrict_dataset(
    dataset: &Dataset,
    subset: &IndexSubset,
    source_counts: &[usize; 3],
) -> Result<Dataset, MeshError> {
    dataset
        .iter()
        .map(|field| restrict_field(field, subset, source_counts))
        .collect()
}
