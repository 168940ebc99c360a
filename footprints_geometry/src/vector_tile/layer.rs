//! One named layer of a vector tile.
//!
//! Wire layout: field 1 `name`, 2 `feature` (repeated), 3 `keys` (repeated),
//! 4 `values` (repeated), 5 `extent` (default 4096), 15 `version` (default 1).

use super::{
	feature::VectorTileFeature, property_manager::PropertyManager, value::GeoValuePbf,
};
use crate::geo::{GeoFeature, GeoProperties, GeoValue, Geometry, LocalPoint};
use anyhow::{Context, Result, anyhow, bail, ensure};
use footprints_core::{
	Blob, TileCoord,
	io::{ValueReader, ValueWriter, ValueWriterBlob, WIRE_LEN, WIRE_VARINT},
};
use log::trace;

pub const DEFAULT_EXTENT: u32 = 4096;

#[derive(Clone, Debug, PartialEq)]
pub struct VectorTileLayer {
	pub name: String,
	pub features: Vec<VectorTileFeature>,
	pub property_manager: PropertyManager,
	/// Size of the tile in local units.
	pub extent: u32,
	pub version: u32,
}

impl VectorTileLayer {
	#[must_use]
	pub fn new(name: &str, extent: u32, version: u32) -> VectorTileLayer {
		VectorTileLayer {
			name: name.to_string(),
			features: Vec::new(),
			property_manager: PropertyManager::new(),
			extent,
			version,
		}
	}

	/// A layer with extent 4096 and version 2.
	#[must_use]
	pub fn new_standard(name: &str) -> VectorTileLayer {
		VectorTileLayer::new(name, DEFAULT_EXTENT, 2)
	}

	pub fn read(reader: &mut dyn ValueReader<'_>) -> Result<VectorTileLayer> {
		let mut name = None;
		let mut features = Vec::new();
		let mut property_manager = PropertyManager::new();
		let mut extent = DEFAULT_EXTENT;
		let mut version = 1;

		while reader.has_remaining() {
			match reader.read_pbf_key().context("Failed to read PBF key")? {
				(1, WIRE_LEN) => name = Some(reader.read_pbf_string().context("Failed to read layer name")?),
				(2, WIRE_LEN) => features.push(
					VectorTileFeature::read(
						reader
							.get_pbf_sub_reader()
							.context("Failed to get PBF sub-reader for feature")?
							.as_mut(),
					)
					.with_context(|| format!("Failed to read feature #{}", features.len()))?,
				),
				(3, WIRE_LEN) => {
					property_manager.push_key(reader.read_pbf_string().context("Failed to read property key")?);
				}
				(4, WIRE_LEN) => {
					property_manager.push_val(
						GeoValue::read(
							reader
								.get_pbf_sub_reader()
								.context("Failed to get PBF sub-reader for property value")?
								.as_mut(),
						)
						.context("Failed to read property value")?,
					);
				}
				(5, WIRE_VARINT) => extent = u32::try_from(reader.read_varint().context("Failed to read extent")?)?,
				(15, WIRE_VARINT) => version = u32::try_from(reader.read_varint().context("Failed to read version")?)?,
				(f, w) => bail!("Unexpected combination of field number ({f}) and wire type ({w}) in layer"),
			}
		}

		ensure!(extent > 0, "Layer extent must be positive");

		Ok(VectorTileLayer {
			name: name.ok_or_else(|| anyhow!("Layer name is required"))?,
			features,
			property_manager,
			extent,
			version,
		})
	}

	pub fn to_blob(&self) -> Result<Blob> {
		let mut writer = ValueWriterBlob::new();

		writer.write_pbf_key(1, WIRE_LEN)?;
		writer.write_pbf_string(&self.name).context("Failed to write layer name")?;

		for feature in &self.features {
			writer.write_pbf_key(2, WIRE_LEN)?;
			writer
				.write_pbf_blob(&feature.to_blob()?)
				.context("Failed to write feature")?;
		}

		for key in self.property_manager.iter_key() {
			writer.write_pbf_key(3, WIRE_LEN)?;
			writer.write_pbf_string(key).context("Failed to write property key")?;
		}

		for value in self.property_manager.iter_val() {
			writer.write_pbf_key(4, WIRE_LEN)?;
			writer
				.write_pbf_blob(&value.to_blob()?)
				.context("Failed to write property value")?;
		}

		if self.extent != DEFAULT_EXTENT {
			writer.write_pbf_key(5, WIRE_VARINT)?;
			writer.write_varint(u64::from(self.extent)).context("Failed to write extent")?;
		}

		if self.version != 1 {
			writer.write_pbf_key(15, WIRE_VARINT)?;
			writer.write_varint(u64::from(self.version)).context("Failed to write version")?;
		}

		Ok(writer.into_blob())
	}

	/// Appends a feature with local geometry and attributes, extending the key/value tables.
	pub fn add_feature(&mut self, geometry: &Geometry<LocalPoint>, properties: &GeoProperties) -> Result<()> {
		let tag_ids = self.property_manager.encode_tag_ids(properties);
		self.features.push(VectorTileFeature::from_geometry(tag_ids, geometry)?);
		Ok(())
	}

	/// Decodes every feature and projects it onto `tile`.
	///
	/// Local position `(px, py)` becomes the geographic position of the fractional tile
	/// coordinate `(x + px/extent, y + py/extent)`.
	pub fn to_features(&self, tile: &TileCoord) -> Result<Vec<GeoFeature>> {
		let extent = f64::from(self.extent);
		let x0 = f64::from(tile.x);
		let y0 = f64::from(tile.y);

		let mut features = Vec::with_capacity(self.features.len());
		for (index, feature) in self.features.iter().enumerate() {
			let Some(local) = feature
				.to_local_geometry()
				.with_context(|| format!("Failed to decode geometry of feature #{index}"))?
			else {
				trace!("feature #{index} of layer '{}' has no usable geometry", self.name);
				continue;
			};

			let geometry = local.map_points(|[px, py]| TileCoord::coord_to_geo(tile.level, x0 + px / extent, y0 + py / extent));

			let mut geo_feature = GeoFeature::new(geometry, &self.name);
			geo_feature.properties = self
				.property_manager
				.decode_tag_ids(&feature.tag_ids)
				.with_context(|| format!("Failed to decode properties of feature #{index}"))?;
			features.push(geo_feature);
		}
		Ok(features)
	}
}
