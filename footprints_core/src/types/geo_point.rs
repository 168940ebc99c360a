//! `GeoPoint`: a WGS84 position, stored longitude first like GeoJSON.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// Latitude limit of the square Web Mercator world.
pub const MAX_MERCATOR_LAT: f64 = 85.05112877980659;

#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
	pub lon: f64,
	pub lat: f64,
}

impl GeoPoint {
	#[must_use]
	pub fn new(lon: f64, lat: f64) -> GeoPoint {
		GeoPoint { lon, lat }
	}

	#[must_use]
	pub fn as_array(&self) -> [f64; 2] {
		[self.lon, self.lat]
	}

	/// Position in normalized Web Mercator units: x and y in `[0, 1]`, y growing southwards.
	///
	/// Latitudes beyond [`MAX_MERCATOR_LAT`] are clamped.
	#[must_use]
	pub fn to_mercator(&self) -> [f64; 2] {
		let lat = self.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
		[
			self.lon / 360.0 + 0.5,
			0.5 - (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln() / (2.0 * std::f64::consts::PI),
		]
	}
}

impl From<[f64; 2]> for GeoPoint {
	fn from(value: [f64; 2]) -> Self {
		GeoPoint::new(value[0], value[1])
	}
}

impl From<GeoPoint> for [f64; 2] {
	fn from(value: GeoPoint) -> Self {
		value.as_array()
	}
}

impl Debug for GeoPoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}, {}]", self.lon, self.lat)
	}
}
