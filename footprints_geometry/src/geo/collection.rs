//! Assembling decoded features into a GeoJSON `FeatureCollection`.

use super::GeoFeature;
use footprints_core::GeoBBox;
use serde::{Serialize, Serializer, ser::SerializeStruct};

/// Features in decode order. Duplicates are kept.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeoCollection {
	pub features: Vec<GeoFeature>,
}

impl GeoCollection {
	#[must_use]
	pub fn new() -> GeoCollection {
		GeoCollection::default()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.features.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.features.is_empty()
	}

	pub fn push(&mut self, feature: GeoFeature) {
		self.features.push(feature);
	}

	pub fn iter(&self) -> std::slice::Iter<'_, GeoFeature> {
		self.features.iter()
	}

	/// Bounds of every point of every feature; `None` when there are no points at all.
	#[must_use]
	pub fn bounding_box(&self) -> Option<GeoBBox> {
		self
			.features
			.iter()
			.filter_map(GeoFeature::bounding_box)
			.reduce(|a, b| a.extended(&b))
	}
}

impl From<Vec<GeoFeature>> for GeoCollection {
	fn from(features: Vec<GeoFeature>) -> Self {
		GeoCollection { features }
	}
}

impl<'a> IntoIterator for &'a GeoCollection {
	type Item = &'a GeoFeature;
	type IntoIter = std::slice::Iter<'a, GeoFeature>;

	fn into_iter(self) -> Self::IntoIter {
		self.features.iter()
	}
}

impl Serialize for GeoCollection {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let bbox = self.bounding_box();
		let mut s = serializer.serialize_struct("FeatureCollection", if bbox.is_some() { 3 } else { 2 })?;
		s.serialize_field("type", "FeatureCollection")?;
		if let Some(bbox) = bbox {
			s.serialize_field("bbox", &bbox)?;
		} else {
			s.skip_field("bbox")?;
		}
		s.serialize_field("features", &self.features)?;
		s.end()
	}
}
