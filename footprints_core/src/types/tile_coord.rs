//! Tile addresses in the Web Mercator (XYZ) tile pyramid.
//!
//! [`TileCoord::from_geo`] maps a WGS84 position onto the tile containing it,
//! [`TileCoord::coord_to_geo`] maps fractional tile positions back to WGS84.
//! Both use the same formulas, so tile corners computed either way agree.

use crate::{FootprintError, FootprintResult, GeoBBox, GeoPoint};
use anyhow::{Result, ensure};
use serde::Serialize;
use std::{
	f64::consts::PI,
	fmt::{self, Debug, Display},
};

/// Deepest zoom level a tile address can have.
pub const MAX_LEVEL: u8 = 31;

#[derive(Eq, PartialEq, Clone, Hash, Copy, Serialize)]
pub struct TileCoord {
	#[serde(rename = "z")]
	pub level: u8,
	pub x: u32,
	pub y: u32,
}

impl TileCoord {
	/// Creates a tile address, checking that `x` and `y` exist at `level`.
	pub fn new(level: u8, x: u32, y: u32) -> Result<TileCoord> {
		ensure!(level <= MAX_LEVEL, "level ({level}) must be <= {MAX_LEVEL}");
		let max = TileCoord::size(level);
		ensure!(u64::from(x) < max, "x ({x}) out of bounds for level {level}");
		ensure!(u64::from(y) < max, "y ({y}) out of bounds for level {level}");
		Ok(TileCoord { level, x, y })
	}

	/// Number of tiles per axis at `level`.
	fn size(level: u8) -> u64 {
		1u64 << level
	}

	/// Returns the tile containing the position (`lon`, `lat`) at zoom `z`.
	///
	/// Longitudes outside `[-180, 180]` and latitudes outside `[-90, 90]` are clamped,
	/// as are the resulting indices, which end up in `[0, 2^z - 1]`. Poles therefore
	/// map to the first or last row.
	///
	/// Fails with [`FootprintError::InvalidCoordinate`] for non-finite input or `z > 31`.
	///
	/// ```
	/// use footprints_core::TileCoord;
	///
	/// let coord = TileCoord::from_geo(-122.4194, 37.7749, 19).unwrap();
	/// assert_eq!((coord.level, coord.x, coord.y), (19, 83857, 202648));
	/// ```
	pub fn from_geo(lon: f64, lat: f64, z: u8) -> FootprintResult<TileCoord> {
		let input = || format!("lon={lon}, lat={lat}, zoom={z}");
		if z > MAX_LEVEL {
			return Err(FootprintError::invalid_coordinate(
				input(),
				format!("zoom must be <= {MAX_LEVEL}"),
			));
		}
		if !lon.is_finite() {
			return Err(FootprintError::invalid_coordinate(
				input(),
				"longitude must be a finite number",
			));
		}
		if !lat.is_finite() {
			return Err(FootprintError::invalid_coordinate(
				input(),
				"latitude must be a finite number",
			));
		}

		let lon = lon.clamp(-180.0, 180.0);
		let lat = lat.clamp(-90.0, 90.0);

		let zoom = TileCoord::size(z) as f64;
		let x = zoom * (lon / 360.0 + 0.5);
		let y = zoom * (0.5 - 0.5 * (lat * PI / 360.0 + PI / 4.0).tan().ln() / PI);

		// at the poles `y` becomes ±inf or NaN, `clamp` would keep the NaN
		let y = if y.is_nan() { zoom - 1.0 } else { y };

		Ok(TileCoord {
			level: z,
			x: x.clamp(0.0, zoom - 1.0).floor() as u32,
			y: y.clamp(0.0, zoom - 1.0).floor() as u32,
		})
	}

	/// Converts a fractional tile position at `level` into WGS84.
	///
	/// Integer positions are tile corners, so `(x + 0.5, y + 0.5)` is a tile center.
	#[must_use]
	pub fn coord_to_geo(level: u8, x: f64, y: f64) -> GeoPoint {
		let zoom = TileCoord::size(level) as f64;
		GeoPoint::new(
			(x / zoom - 0.5) * 360.0,
			(PI * (1.0 - 2.0 * y / zoom)).sinh().atan().to_degrees(),
		)
	}

	/// North-west corner of this tile.
	#[must_use]
	pub fn as_geo(&self) -> GeoPoint {
		TileCoord::coord_to_geo(self.level, f64::from(self.x), f64::from(self.y))
	}

	/// Geographic bounds of this tile.
	#[must_use]
	pub fn to_geo_bbox(&self) -> GeoBBox {
		let nw = self.as_geo();
		let se = TileCoord::coord_to_geo(self.level, f64::from(self.x) + 1.0, f64::from(self.y) + 1.0);
		GeoBBox::from_corners(nw, se)
	}

	#[must_use]
	pub fn max_value(&self) -> u32 {
		(TileCoord::size(self.level) - 1) as u32
	}
}

impl Display for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}/{}", self.level, self.x, self.y)
	}
}

impl Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TileCoord({}, [{}, {}])", self.level, self.x, self.y)
	}
}
