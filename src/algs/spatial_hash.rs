//! Uniform bucket grid over lon/lat coordinates.
//!
//! The grid is sized so that, on average, only a fraction (`occupancy`) of the
//! buckets hold an element: with `count` elements spread over a box of extent
//! `Δlon × Δlat`, each bucket is a square of side
//! `d = sqrt(Δlon · Δlat / count · occupancy)`. For quasi-uniform grids this
//! leaves every element alone in its bucket, so a lookup is a single division
//! and array access. Construction fails on the first collision; a grid is
//! never silently lossy.

use std::num::NonZeroU32;

use log::{debug, warn};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use static_assertions::{assert_eq_size, assert_impl_all};

use crate::geometry::bounds::LonLatBox;
use crate::mesh_error::MeshError;
use crate::topology::location::Location;
use crate::topology::mesh::Mesh;

/// Fraction of buckets expected to be occupied when none is given.
pub const DEFAULT_OCCUPANCY: f64 = 0.3;

assert_eq_size!(Option<NonZeroU32>, u32);

/// Geometry of a bucket grid: bounds, bucket side and bucket counts.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GridSpec {
    pub bounds: LonLatBox,
    /// Side of a (square) bucket, radians.
    pub d: f64,
    pub nx: usize,
    pub ny: usize,
}

impl GridSpec {
    /// Size a grid for the given coordinates.
    ///
    /// The bucket side is the occupancy-scaled area per element,
    /// `sqrt(Δlon · Δlat / count · occupancy)`, but never less than the
    /// per-element share of either axis, `Δ · occupancy / count`. That floor
    /// only matters for thin or collinear point sets: elements on one
    /// latitude ring get a single row of buckets, and the total bucket count
    /// stays within a small multiple of `count / occupancy`.
    ///
    /// A single element gets a 1×1 grid. Empty input, non-finite coordinates
    /// and coincident points (zero extent on both axes) are reported as
    /// [`MeshError::DegenerateExtent`].
    pub fn from_coords(
        location: Location,
        lon: &[f64],
        lat: &[f64],
        occupancy: f64,
    ) -> Result<Self, MeshError> {
        check_occupancy(occupancy)?;
        if lon.len() != lat.len() {
            let (lon_name, lat_name) = location.coordinate_names();
            return Err(MeshError::LengthMismatch {
                what: format!("{lat_name} (vs {lon_name})"),
                expected: lon.len(),
                found: lat.len(),
            });
        }
        let count = lon.len();
        if count >= u32::MAX as usize {
            return Err(MeshError::InvalidConfig(format!(
                "{count} {location} elements exceed the bucket index range"
            )));
        }
        let bounds = LonLatBox::from_coords(lon, lat).ok_or(MeshError::DegenerateExtent {
            location,
            count,
            lon_extent: f64::NAN,
            lat_extent: f64::NAN,
        })?;
        let (lon_extent, lat_extent) = (bounds.lon_extent(), bounds.lat_extent());
        if count == 1 {
            return Ok(Self {
                bounds,
                d: 1.0,
                nx: 1,
                ny: 1,
            });
        }
        let degenerate = MeshError::DegenerateExtent {
            location,
            count,
            lon_extent,
            lat_extent,
        };
        let share = occupancy / count as f64;
        let d = (lon_extent * lat_extent * share)
            .sqrt()
            .max(lon_extent * share)
            .max(lat_extent * share);
        if !(d.is_finite() && d > 0.0) {
            return Err(degenerate);
        }
        let (Some(nx), Some(ny)) = (buckets_along(lon_extent, d), buckets_along(lat_extent, d))
        else {
            return Err(degenerate);
        };
        if nx.checked_mul(ny).is_none() {
            return Err(degenerate);
        }
        Ok(Self { bounds, d, nx, ny })
    }

    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bucket of a coordinate, `None` when it lies outside the closed bounds
    /// (or is NaN).
    pub fn coord_to_bucket(&self, lon: f64, lat: f64) -> Option<(usize, usize)> {
        self.bounds
            .contains_closed(lon, lat)
            .then(|| self.bucket_of(lon, lat))
    }

    /// Bucket of a coordinate known to lie inside the bounds.
    #[inline]
    fn bucket_of(&self, lon: f64, lat: f64) -> (usize, usize) {
        let ix = ((lon - self.bounds.lon[0]) / self.d).floor() as usize;
        let iy = ((lat - self.bounds.lat[0]) / self.d).floor() as usize;
        (ix.min(self.nx - 1), iy.min(self.ny - 1))
    }

    #[inline]
    fn offset(&self, (ix, iy): (usize, usize)) -> usize {
        ix * self.ny + iy
    }
}

/// Outcome of a bucket lookup.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Lookup {
    /// The query lies outside the grid bounds.
    OutOfBounds,
    /// The query's bucket holds no element.
    Empty,
    /// 0-based index of the element owning the bucket.
    Element(usize),
}

impl Lookup {
    /// The element index, if any.
    pub fn element(self) -> Option<usize> {
        match self {
            Lookup::Element(i) => Some(i),
            _ => None,
        }
    }
}

/// Immutable bucket grid mapping each bucket to at most one element.
#[derive(Clone, Debug, PartialEq)]
pub struct BucketGrid {
    location: Location,
    spec: GridSpec,
    buckets: Vec<Option<NonZeroU32>>,
}

assert_impl_all!(BucketGrid: Send, Sync);

impl BucketGrid {
    /// Hash the coordinates of `location` elements.
    ///
    /// Bucket positions are computed first (in parallel with the `rayon`
    /// feature), then filled in element order, so the reported collision is
    /// always the pair with the smallest second index.
    pub fn build(
        location: Location,
        lon: &[f64],
        lat: &[f64],
        occupancy: f64,
    ) -> Result<Self, MeshError> {
        let spec = GridSpec::from_coords(location, lon, lat, occupancy)?;
        debug!(
            "{location} hash grid: {} x {} buckets of {:.3e} rad for {} elements",
            spec.nx,
            spec.ny,
            spec.d,
            lon.len()
        );

        #[cfg(feature = "rayon")]
        let positions: Vec<usize> = lon
            .par_iter()
            .zip(lat.par_iter())
            .map(|(&x, &y)| spec.offset(spec.bucket_of(x, y)))
            .collect();
        #[cfg(not(feature = "rayon"))]
        let positions: Vec<usize> = lon
            .iter()
            .zip(lat)
            .map(|(&x, &y)| spec.offset(spec.bucket_of(x, y)))
            .collect();

        let mut buckets: Vec<Option<NonZeroU32>> = vec![None; spec.len()];
        for (element, pos) in positions.into_iter().enumerate() {
            let slot = &mut buckets[pos];
            if let Some(first) = slot {
                return Err(MeshError::HashCollision {
                    location,
                    bucket: (pos / spec.ny, pos % spec.ny),
                    first: first.get() as usize - 1,
                    second: element,
                });
            }
            *slot = NonZeroU32::new(element as u32 + 1);
        }

        if lon.len() * 2 > spec.len() {
            warn!(
                "{location} hash grid is {}% occupied; close to colliding",
                100 * lon.len() / spec.len()
            );
        }
        Ok(Self {
            location,
            spec,
            buckets,
        })
    }

    /// Hash the coordinates of one element kind of `mesh`.
    pub fn for_mesh(mesh: &Mesh, location: Location, occupancy: f64) -> Result<Self, MeshError> {
        let coords = mesh.coords(location);
        Self::build(location, &coords.lon, &coords.lat, occupancy)
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Number of occupied buckets, equal to the number of hashed elements.
    pub fn occupied(&self) -> usize {
        self.buckets.iter().filter(|b| b.is_some()).count()
    }

    /// Element in bucket `(ix, iy)`.
    pub fn get(&self, ix: usize, iy: usize) -> Option<usize> {
        if ix >= self.spec.nx || iy >= self.spec.ny {
            return None;
        }
        self.buckets[self.spec.offset((ix, iy))].map(|n| n.get() as usize - 1)
    }

    /// Look a coordinate up.
    #[inline]
    pub fn lookup(&self, lon: f64, lat: f64) -> Lookup {
        match self.spec.coord_to_bucket(lon, lat) {
            None => Lookup::OutOfBounds,
            Some(b) => match self.buckets[self.spec.offset(b)] {
                None => Lookup::Empty,
                Some(n) => Lookup::Element(n.get() as usize - 1),
            },
        }
    }

    /// Element owning the bucket of `(lon, lat)`, if any.
    pub fn locate(&self, lon: f64, lat: f64) -> Option<usize> {
        self.lookup(lon, lat).element()
    }

    /// Batch lookup; `lon` and `lat` are zipped, extra entries are ignored.
    pub fn locate_many(&self, lon: &[f64], lat: &[f64]) -> Vec<Lookup> {
        #[cfg(feature = "rayon")]
        {
            lon.par_iter()
                .zip(lat.par_iter())
                .map(|(&x, &y)| self.lookup(x, y))
                .collect()
        }
        #[cfg(not(feature = "rayon"))]
        {
            lon.iter()
                .zip(lat)
                .map(|(&x, &y)| self.lookup(x, y))
                .collect()
        }
    }

    /// Buckets as a flat `[nx][ny]` array: `0` for empty, otherwise the
    /// 1-based element index.
    pub fn to_raw(&self) -> Vec<u32> {
        self.buckets
            .iter()
            .map(|b| b.map_or(0, NonZeroU32::get))
            .collect()
    }
}

/// Hash cell-center coordinates with [`DEFAULT_OCCUPANCY`].
pub fn build_spatial_hash(lon: &[f64], lat: &[f64]) -> Result<BucketGrid, MeshError> {
    BucketGrid::build(Location::Cell, lon, lat, DEFAULT_OCCUPANCY)
}

/// Bucket grids for all three element kinds of a mesh.
#[derive(Clone, Debug)]
pub struct MeshSpatialIndex {
    cells: BucketGrid,
    edges: BucketGrid,
    vertices: BucketGrid,
}

assert_impl_all!(MeshSpatialIndex: Send, Sync);

impl MeshSpatialIndex {
    pub fn build(mesh: &Mesh, occupancy: f64) -> Result<Self, MeshError> {
        Ok(Self {
            cells: BucketGrid::for_mesh(mesh, Location::Cell, occupancy)?,
            edges: BucketGrid::for_mesh(mesh, Location::Edge, occupancy)?,
            vertices: BucketGrid::for_mesh(mesh, Location::Vertex, occupancy)?,
        })
    }

    pub fn grid(&self, location: Location) -> &BucketGrid {
        match location {
            Location::Cell => &self.cells,
            Location::Edge => &self.edges,
            Location::Vertex => &self.vertices,
        }
    }

    pub fn locate(&self, location: Location, lon: f64, lat: f64) -> Option<usize> {
        self.grid(location).locate(lon, lat)
    }

    pub fn locate_many(&self, location: Location, lon: &[f64], lat: &[f64]) -> Vec<Lookup> {
        self.grid(location).locate_many(lon, lat)
    }
}

/// `ceil(extent / d) + 1`, or `None` when it does not fit a `usize`.
fn buckets_along(extent: f64, d: f64) -> Option<usize> {
    let n = (extent / d).ceil();
    // usize::MAX as f64 rounds up, so compare strictly
    (n.is_finite() && n >= 0.0 && n < usize::MAX as f64)
        .then(|| n as usize)
        .and_then(|n| n.checked_add(1))
}

pub(crate) fn check_occupancy(occupancy: f64) -> Result<(), MeshError> {
    if occupancy > 0.0 && occupancy <= 1.0 {
        Ok(())
    } else {
        Err(MeshError::InvalidConfig(format!(
            "occupancy must lie in (0, 1], got {occupancy}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::meshgen::triangular_lattice;
    use crate::mesh_error::ErrorKind;

    #[test]
    fn grid_dimensions_follow_occupancy() {
        // 100 points on a 10 x 10 unit square
        let lon: Vec<f64> = (0..100).map(|i| (i % 10) as f64).collect();
        let lat: Vec<f64> = (0..100).map(|i| (i / 10) as f64).collect();
        let spec = GridSpec::from_coords(Location::Cell, &lon, &lat, 0.25).unwrap();
        // area = 81 / 100 * 0.25, d = 0.45
        assert!((spec.d - 0.45).abs() < 1e-12);
        assert!((21..=22).contains(&spec.nx));
        assert_eq!(spec.nx, spec.ny);
        let grid = BucketGrid::build(Location::Cell, &lon, &lat, 0.25).unwrap();
        assert_eq!(grid.occupied(), 100);
        for i in 0..100 {
            assert_eq!(grid.lookup(lon[i], lat[i]), Lookup::Element(i));
        }
    }

    #[test]
    fn lookup_distinguishes_outcomes() {
        let grid = build_spatial_hash(&[0.0, 1.0, 0.0], &[0.0, 0.0, 1.0]).unwrap();
        assert_eq!(grid.lookup(1.0, 0.0), Lookup::Element(1));
        assert_eq!(grid.lookup(1.5, 0.0), Lookup::OutOfBounds);
        assert_eq!(grid.lookup(f64::NAN, 0.0), Lookup::OutOfBounds);
        assert_eq!(grid.lookup(0.9, 0.9), Lookup::Empty);
        assert_eq!(grid.spec().coord_to_bucket(-0.1, 0.5), None);
    }

    #[test]
    fn raw_export_is_one_based() {
        let grid = build_spatial_hash(&[0.0, 1.0], &[0.0, 1.0]).unwrap();
        let raw = grid.to_raw();
        assert_eq!(raw.len(), grid.spec().len());
        let mut nonzero: Vec<u32> = raw.into_iter().filter(|&v| v != 0).collect();
        nonzero.sort_unstable();
        assert_eq!(nonzero, vec![1, 2]);
        assert_eq!(grid.get(0, 0), Some(0));
    }

    #[test]
    fn duplicate_coordinates_collide() {
        let err = build_spatial_hash(&[0.0, 1.0, 0.5, 1.0], &[0.0, 1.0, 0.5, 1.0]).unwrap_err();
        assert!(matches!(
            err,
            MeshError::HashCollision {
                location: Location::Cell,
                first: 1,
                second: 3,
                ..
            }
        ));
    }

    #[test]
    fn degenerate_inputs() {
        let err = build_spatial_hash(&[], &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DegenerateGrid);
        let err = build_spatial_hash(&[1.0, 1.0], &[2.0, 2.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DegenerateGrid);
        let err = build_spatial_hash(&[0.0, f64::INFINITY], &[0.0, 1.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DegenerateGrid);

        let single = build_spatial_hash(&[0.3], &[0.7]).unwrap();
        assert_eq!((single.spec().nx, single.spec().ny), (1, 1));
        assert_eq!(single.locate(0.3, 0.7), Some(0));
    }

    #[test]
    fn single_ring_uses_one_row() {
        let lon = [0.0, 0.25, 0.5, 1.0];
        let grid = build_spatial_hash(&lon, &[2.0; 4]).unwrap();
        assert_eq!(grid.spec().ny, 1);
        for (i, &x) in lon.iter().enumerate() {
            assert_eq!(grid.locate(x, 2.0), Some(i));
        }
    }

    #[test]
    fn thin_extent_stays_bounded() {
        let grid = build_spatial_hash(&[0.0, 1.0], &[0.0, 1e-200]).unwrap();
        assert_eq!((grid.spec().nx, grid.spec().ny), (8, 2));
        assert_eq!(grid.locate(0.0, 0.0), Some(0));
        assert_eq!(grid.locate(1.0, 1e-200), Some(1));

        let grid = build_spatial_hash(&[0.0, 1e-300], &[0.0, 1e300]).unwrap();
        assert_eq!(grid.spec().nx, 1);
        assert_eq!(grid.locate(1e-300, 1e300), Some(1));
    }

    #[test]
    fn bad_occupancy_rejected() {
        for occ in [0.0, -0.1, 1.5, f64::NAN] {
            let err = BucketGrid::build(Location::Edge, &[0.0, 1.0], &[0.0, 1.0], occ).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        }
    }

    #[test]
    fn all_lattice_kinds_hash_cleanly() {
        let mesh = triangular_lattice(12, 9, [0.1, 0.6], 0.002).unwrap();
        let index = MeshSpatialIndex::build(&mesh, DEFAULT_OCCUPANCY).unwrap();
        for loc in Location::ALL {
            let coords = mesh.coords(loc);
            let found = index.locate_many(loc, &coords.lon, &coords.lat);
            let expected: Vec<Lookup> = (0..coords.len()).map(Lookup::Element).collect();
            assert_eq!(found, expected, "{loc}");
            assert_eq!(index.grid(loc).location(), loc);
        }
    }
}
