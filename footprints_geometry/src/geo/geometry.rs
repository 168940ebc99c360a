//! The six GeoJSON geometry kinds.
//!
//! `Geometry` is generic over its point type. Decoded vector tile geometry lives in
//! tile-local pixel space ([`LocalPoint`]) until it is projected into [`GeoPoint`]s.

use footprints_core::{GeoBBox, GeoPoint};
use serde::{Serialize, Serializer, ser::SerializeStruct};

/// A position inside a vector tile, in units of the layer extent, y pointing down.
pub type LocalPoint = [f64; 2];

#[derive(Clone, Debug, PartialEq)]
pub enum Geometry<P = GeoPoint> {
	Point(P),
	MultiPoint(Vec<P>),
	LineString(Vec<P>),
	MultiLineString(Vec<Vec<P>>),
	Polygon(Vec<Vec<P>>),
	MultiPolygon(Vec<Vec<Vec<P>>>),
}

impl<P> Geometry<P> {
	/// GeoJSON type name.
	#[must_use]
	pub fn get_type(&self) -> &'static str {
		match self {
			Geometry::Point(_) => "Point",
			Geometry::MultiPoint(_) => "MultiPoint",
			Geometry::LineString(_) => "LineString",
			Geometry::MultiLineString(_) => "MultiLineString",
			Geometry::Polygon(_) => "Polygon",
			Geometry::MultiPolygon(_) => "MultiPolygon",
		}
	}

	/// Builds the point variant: a single point stays a `Point`.
	pub fn from_points(mut points: Vec<P>) -> Self {
		if points.len() == 1 {
			if let Some(point) = points.pop() {
				return Geometry::Point(point);
			}
		}
		Geometry::MultiPoint(points)
	}

	/// Builds the line variant: a single line stays a `LineString`.
	pub fn from_lines(mut lines: Vec<Vec<P>>) -> Self {
		if lines.len() == 1 {
			if let Some(line) = lines.pop() {
				return Geometry::LineString(line);
			}
		}
		Geometry::MultiLineString(lines)
	}

	/// Builds the polygon variant: a single polygon stays a `Polygon`.
	pub fn from_polygons(mut polygons: Vec<Vec<Vec<P>>>) -> Self {
		if polygons.len() == 1 {
			if let Some(polygon) = polygons.pop() {
				return Geometry::Polygon(polygon);
			}
		}
		Geometry::MultiPolygon(polygons)
	}

	/// Applies `f` to every point, keeping the structure.
	pub fn map_points<Q>(self, mut f: impl FnMut(P) -> Q) -> Geometry<Q> {
		let mut line = |l: Vec<P>| l.into_iter().map(&mut f).collect::<Vec<Q>>();
		match self {
			Geometry::Point(p) => Geometry::Point(f(p)),
			Geometry::MultiPoint(ps) => Geometry::MultiPoint(line(ps)),
			Geometry::LineString(l) => Geometry::LineString(line(l)),
			Geometry::MultiLineString(ls) => Geometry::MultiLineString(ls.into_iter().map(line).collect()),
			Geometry::Polygon(rings) => Geometry::Polygon(rings.into_iter().map(line).collect()),
			Geometry::MultiPolygon(polygons) => Geometry::MultiPolygon(
				polygons
					.into_iter()
					.map(|rings| rings.into_iter().map(&mut line).collect())
					.collect(),
			),
		}
	}

	/// Visits every point of every part.
	pub fn for_each_point(&self, mut f: impl FnMut(&P)) {
		match self {
			Geometry::Point(p) => f(p),
			Geometry::MultiPoint(ps) | Geometry::LineString(ps) => ps.iter().for_each(f),
			Geometry::MultiLineString(ls) | Geometry::Polygon(ls) => ls.iter().flatten().for_each(f),
			Geometry::MultiPolygon(polygons) => polygons.iter().flatten().flatten().for_each(f),
		}
	}

	#[must_use]
	pub fn point_count(&self) -> usize {
		let mut count = 0;
		self.for_each_point(|_| count += 1);
		count
	}
}

impl Geometry<GeoPoint> {
	/// Bounds of all points, `None` if there are none.
	#[must_use]
	pub fn bounding_box(&self) -> Option<GeoBBox> {
		let mut bbox: Option<GeoBBox> = None;
		self.for_each_point(|point| match bbox.as_mut() {
			Some(b) => b.include_point(point),
			None => bbox = Some(GeoBBox::from_point(point)),
		});
		bbox
	}
}

impl<P: Serialize> Serialize for Geometry<P> {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut s = serializer.serialize_struct("Geometry", 2)?;
		s.serialize_field("type", self.get_type())?;
		match self {
			Geometry::Point(c) => s.serialize_field("coordinates", c)?,
			Geometry::MultiPoint(c) | Geometry::LineString(c) => s.serialize_field("coordinates", c)?,
			Geometry::MultiLineString(c) | Geometry::Polygon(c) => s.serialize_field("coordinates", c)?,
			Geometry::MultiPolygon(c) => s.serialize_field("coordinates", c)?,
		}
		s.end()
	}
}
