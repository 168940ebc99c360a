use super::GeoValue;
use serde::Serialize;
use std::collections::BTreeMap;

/// Feature attributes, ordered by key.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GeoProperties(BTreeMap<String, GeoValue>);

impl GeoProperties {
	#[must_use]
	pub fn new() -> GeoProperties {
		GeoProperties(BTreeMap::new())
	}

	pub fn insert(&mut self, key: String, value: GeoValue) {
		self.0.insert(key, value);
	}

	#[must_use]
	pub fn get(&self, key: &str) -> Option<&GeoValue> {
		self.0.get(key)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&String, &GeoValue)> {
		self.0.iter()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl IntoIterator for GeoProperties {
	type Item = (String, GeoValue);
	type IntoIter = std::collections::btree_map::IntoIter<String, GeoValue>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl<K: Into<String>, V: Into<GeoValue>> FromIterator<(K, V)> for GeoProperties {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		GeoProperties(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}
