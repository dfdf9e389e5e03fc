//! Longitude/latitude bounding boxes.
//!
//! Coordinates are radians throughout the crate; [`LonLatBox::from_degrees`]
//! and [`LonLatBox::to_degrees`] exist for callers and log messages.

use std::fmt;

use num_traits::Float;

use crate::mesh_error::MeshError;

/// An axis-aligned lon/lat box `[lon[0], lon[1]] x [lat[0], lat[1]]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LonLatBox {
    pub lon: [f64; 2],
    pub lat: [f64; 2],
}

impl LonLatBox {
    /// A request box: finite bounds with `min < max` on both axes.
    pub fn new(lon: [f64; 2], lat: [f64; 2]) -> Result<Self, MeshError> {
        let ok = lon.iter().chain(lat.iter()).all(|v| v.is_finite())
            && lon[0] < lon[1]
            && lat[0] < lat[1];
        if !ok {
            return Err(MeshError::InvalidBounds { lon, lat });
        }
        Ok(Self { lon, lat })
    }

    /// Request box given in degrees.
    pub fn from_degrees(lon: [f64; 2], lat: [f64; 2]) -> Result<Self, MeshError> {
        Self::new(
            [lon[0].to_radians(), lon[1].to_radians()],
            [lat[0].to_radians(), lat[1].to_radians()],
        )
    }

    /// Tight bounds of a coordinate set; zero extent is allowed.
    ///
    /// Returns `None` for empty input or when any coordinate is not finite.
    pub fn from_coords<T: Float>(lon: &[T], lat: &[T]) -> Option<Self> {
        let (lon_min, lon_max) = min_max(lon)?;
        let (lat_min, lat_max) = min_max(lat)?;
        Some(Self {
            lon: [lon_min.to_f64()?, lon_max.to_f64()?],
            lat: [lat_min.to_f64()?, lat_max.to_f64()?],
        })
    }

    /// The same box in degrees.
    pub fn to_degrees(&self) -> Self {
        Self {
            lon: [self.lon[0].to_degrees(), self.lon[1].to_degrees()],
            lat: [self.lat[0].to_degrees(), self.lat[1].to_degrees()],
        }
    }

    pub fn lon_extent(&self) -> f64 {
        self.lon[1] - self.lon[0]
    }

    pub fn lat_extent(&self) -> f64 {
        self.lat[1] - self.lat[0]
    }

    /// Strictly inside: points on the boundary are excluded.
    #[inline]
    pub fn contains_open(&self, lon: f64, lat: f64) -> bool {
        lon > self.lon[0] && lon < self.lon[1] && lat > self.lat[0] && lat < self.lat[1]
    }

    /// Inside or on the boundary.
    #[inline]
    pub fn contains_closed(&self, lon: f64, lat: f64) -> bool {
        lon >= self.lon[0] && lon <= self.lon[1] && lat >= self.lat[0] && lat <= self.lat[1]
    }

    /// Whether the closed boxes share at least one point.
    pub fn intersects(&self, other: &LonLatBox) -> bool {
        !(self.lon[0] > other.lon[1]
            || self.lat[0] > other.lat[1]
            || self.lon[1] < other.lon[0]
            || self.lat[1] < other.lat[0])
    }

    /// Grow every side outward by `margin`.
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            lon: [self.lon[0] - margin, self.lon[1] + margin],
            lat: [self.lat[0] - margin, self.lat[1] + margin],
        }
    }

    /// Shrink about the center: each side moves inward by `extent * scale / 2`.
    ///
    /// `scale` must lie in `[0, 1)`; `0.5` keeps the central half of each axis.
    pub fn shrink(&self, scale: f64) -> Result<Self, MeshError> {
        if !(0.0..1.0).contains(&scale) {
            return Err(MeshError::InvalidConfig(format!(
                "scale must lie in [0, 1), got {scale}"
            )));
        }
        let dlon = self.lon_extent() * scale / 2.0;
        let dlat = self.lat_extent() * scale / 2.0;
        Self::new(
            [self.lon[0] + dlon, self.lon[1] - dlon],
            [self.lat[0] + dlat, self.lat[1] - dlat],
        )
    }
}

impl fmt::Display for LonLatBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lon [{}, {}] lat [{}, {}]",
            self.lon[0], self.lon[1], self.lat[0], self.lat[1]
        )
    }
}

fn min_max<T: Float>(values: &[T]) -> Option<(T, T)> {
    let mut iter = values.iter().copied();
    let first = iter.next()?;
    if !first.is_finite() {
        return None;
    }
    let mut lo = first;
    let mut hi = first;
    for v in iter {
        if !v.is_finite() {
            return None;
        }
        lo = lo.min(v);
        hi = hi.max(v);
    }
    Some((lo, hi))
}
