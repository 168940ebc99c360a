//! `GeoBBox`: an axis aligned geographic bounding box.
//!
//! Serializes as `[west, south, east, north]`, which is the layout of the GeoJSON `bbox` member.

use crate::GeoPoint;
use anyhow::{Result, ensure};
use serde::{Serialize, Serializer};
use std::fmt::{self, Debug};

#[derive(Clone, Copy, PartialEq)]
pub struct GeoBBox {
	pub x_min: f64,
	pub y_min: f64,
	pub x_max: f64,
	pub y_max: f64,
}

impl GeoBBox {
	/// Creates a bbox from west, south, east and north.
	pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<GeoBBox> {
		ensure!(x_min <= x_max, "x_min ({x_min}) must be <= x_max ({x_max})");
		ensure!(y_min <= y_max, "y_min ({y_min}) must be <= y_max ({y_max})");
		Ok(GeoBBox {
			x_min,
			y_min,
			x_max,
			y_max,
		})
	}

	/// A bbox covering exactly one point.
	#[must_use]
	pub fn from_point(point: &GeoPoint) -> GeoBBox {
		GeoBBox {
			x_min: point.lon,
			y_min: point.lat,
			x_max: point.lon,
			y_max: point.lat,
		}
	}

	/// The smallest bbox containing both points, in any order.
	#[must_use]
	pub fn from_corners(a: GeoPoint, b: GeoPoint) -> GeoBBox {
		let mut bbox = GeoBBox::from_point(&a);
		bbox.include_point(&b);
		bbox
	}

	/// Grows the bbox so that it contains `point`.
	pub fn include_point(&mut self, point: &GeoPoint) {
		self.x_min = self.x_min.min(point.lon);
		self.y_min = self.y_min.min(point.lat);
		self.x_max = self.x_max.max(point.lon);
		self.y_max = self.y_max.max(point.lat);
	}

	/// Grows the bbox so that it contains `other`.
	pub fn extend(&mut self, other: &GeoBBox) {
		self.x_min = self.x_min.min(other.x_min);
		self.y_min = self.y_min.min(other.y_min);
		self.x_max = self.x_max.max(other.x_max);
		self.y_max = self.y_max.max(other.y_max);
	}

	#[must_use]
	pub fn extended(mut self, other: &GeoBBox) -> GeoBBox {
		self.extend(other);
		self
	}

	#[must_use]
	pub fn min(&self) -> GeoPoint {
		GeoPoint::new(self.x_min, self.y_min)
	}

	#[must_use]
	pub fn max(&self) -> GeoPoint {
		GeoPoint::new(self.x_max, self.y_max)
	}

	/// Midpoint of min and max.
	#[must_use]
	pub fn center(&self) -> GeoPoint {
		GeoPoint::new((self.x_min + self.x_max) / 2.0, (self.y_min + self.y_max) / 2.0)
	}

	/// `true` if `point` lies inside or on the border, with tolerance `epsilon` degrees.
	#[must_use]
	pub fn contains(&self, point: &GeoPoint, epsilon: f64) -> bool {
		point.lon >= self.x_min - epsilon
			&& point.lon <= self.x_max + epsilon
			&& point.lat >= self.y_min - epsilon
			&& point.lat <= self.y_max + epsilon
	}

	#[must_use]
	pub fn is_point(&self) -> bool {
		self.x_min == self.x_max && self.y_min == self.y_max
	}

	#[must_use]
	pub fn as_array(&self) -> [f64; 4] {
		[self.x_min, self.y_min, self.x_max, self.y_max]
	}
}

impl Serialize for GeoBBox {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.as_array().serialize(serializer)
	}
}

impl Debug for GeoBBox {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}, {}, {}, {}]", self.x_min, self.y_min, self.x_max, self.y_max)
	}
}
