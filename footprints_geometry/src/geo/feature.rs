use super::{GeoProperties, Geometry};
use footprints_core::GeoBBox;
use serde::{Serialize, Serializer, ser::SerializeStruct};

/// A decoded feature: geometry, attributes and the layer it came from.
///
/// Vector tile ids are not stable across tiles, so none is kept.
#[derive(Clone, Debug, PartialEq)]
pub struct GeoFeature {
	pub geometry: Geometry,
	pub properties: GeoProperties,
	pub category: String,
}

impl GeoFeature {
	#[must_use]
	pub fn new(geometry: Geometry, category: &str) -> GeoFeature {
		GeoFeature {
			geometry,
			properties: GeoProperties::new(),
			category: category.to_string(),
		}
	}

	#[must_use]
	pub fn bounding_box(&self) -> Option<GeoBBox> {
		self.geometry.bounding_box()
	}
}

impl Serialize for GeoFeature {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut s = serializer.serialize_struct("Feature", 3)?;
		s.serialize_field("type", "Feature")?;
		s.serialize_field("geometry", &self.geometry)?;
		s.serialize_field("properties", &self.properties)?;
		s.end()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::geo::GeoValue;
	use footprints_core::GeoPoint;

	#[test]
	fn serialize() {
		let mut feature = GeoFeature::new(Geometry::Point(GeoPoint::new(1.5, 2.5)), "building");
		feature.properties.insert("height".to_string(), GeoValue::UInt(9));
		assert_eq!(
			serde_json::to_string(&feature).unwrap(),
			r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[1.5,2.5]},"properties":{"height":9}}"#
		);
		assert_eq!(feature.category, "building");
	}
}
