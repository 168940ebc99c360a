//! Key and value tables of a layer.
//!
//! Features reference their attributes as pairs of indices into these tables.

use crate::geo::{GeoProperties, GeoValue};
use anyhow::{Result, anyhow, ensure};
use std::{collections::HashMap, fmt::Debug, hash::Hash};

/// An indexed list of unique entries with reverse lookup.
#[derive(Clone, PartialEq)]
pub struct ValueTable<T>
where
	T: Clone + Eq + Hash,
{
	list: Vec<T>,
	map: HashMap<T, u32>,
}

impl<T> ValueTable<T>
where
	T: Clone + Debug + Eq + Hash,
{
	/// Appends `entry` as read from the wire. Indices must stay positional, so
	/// duplicates get their own slot; lookups keep pointing at the first one.
	pub fn push(&mut self, entry: T) {
		let index = self.list.len() as u32;
		self.map.entry(entry.clone()).or_insert(index);
		self.list.push(entry);
	}

	/// Returns the index of `entry`, appending it if it is new.
	pub fn add(&mut self, entry: T) -> u32 {
		if let Some(index) = self.map.get(&entry) {
			return *index;
		}
		let index = self.list.len() as u32;
		self.map.insert(entry.clone(), index);
		self.list.push(entry);
		index
	}

	pub fn get(&self, index: u32) -> Result<&T> {
		self
			.list
			.get(index as usize)
			.ok_or_else(|| anyhow!("index {index} out of range, table has {} entries", self.list.len()))
	}

	pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
		self.list.iter()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.list.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.list.is_empty()
	}
}

impl<T: Clone + Eq + Hash> Default for ValueTable<T> {
	fn default() -> ValueTable<T> {
		ValueTable {
			list: Vec::new(),
			map: HashMap::new(),
		}
	}
}

impl<T: Clone + Debug + Eq + Hash> Debug for ValueTable<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(&self.list).finish()
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyManager {
	pub key: ValueTable<String>,
	pub val: ValueTable<GeoValue>,
}

impl PropertyManager {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push_key(&mut self, key: String) {
		self.key.push(key);
	}

	pub fn push_val(&mut self, value: GeoValue) {
		self.val.push(value);
	}

	pub fn iter_key(&self) -> impl Iterator<Item = &String> + '_ {
		self.key.iter()
	}

	pub fn iter_val(&self) -> impl Iterator<Item = &GeoValue> + '_ {
		self.val.iter()
	}

	/// Registers all attributes and returns the tag index pairs referencing them.
	pub fn encode_tag_ids(&mut self, properties: &GeoProperties) -> Vec<u32> {
		let mut tag_ids = Vec::with_capacity(properties.len() * 2);
		for (key, val) in properties.iter() {
			tag_ids.push(self.key.add(key.clone()));
			tag_ids.push(self.val.add(val.clone()));
		}
		tag_ids
	}

	/// Resolves tag index pairs into attributes.
	///
	/// Fails on an odd number of indices or an index outside the tables.
	pub fn decode_tag_ids(&self, tag_ids: &[u32]) -> Result<GeoProperties> {
		ensure!(
			tag_ids.len().is_multiple_of(2),
			"Tag IDs must come in pairs, got {} entries",
			tag_ids.len()
		);

		let mut properties = GeoProperties::new();
		for pair in tag_ids.chunks_exact(2) {
			let key = self.key.get(pair[0]).map_err(|e| e.context("Failed to resolve property key"))?;
			let val = self.val.get(pair[1]).map_err(|e| e.context("Failed to resolve property value"))?;
			properties.insert(key.clone(), val.clone());
		}
		Ok(properties)
	}
}
