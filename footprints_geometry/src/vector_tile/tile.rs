use super::layer::VectorTileLayer;
use anyhow::{Context, Result, bail};
use footprints_core::{
	Blob,
	io::{ValueReader, ValueReaderSlice, ValueWriter, ValueWriterBlob, WIRE_LEN},
};

/// A decoded vector tile: the list of its layers in wire order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VectorTile {
	pub layers: Vec<VectorTileLayer>,
}

impl VectorTile {
	#[must_use]
	pub fn new(layers: Vec<VectorTileLayer>) -> VectorTile {
		VectorTile { layers }
	}

	/// Parses an uncompressed tile.
	pub fn from_blob(blob: &Blob) -> Result<VectorTile> {
		let mut reader = ValueReaderSlice::new(blob.as_slice());

		let mut tile = VectorTile::default();
		while reader.has_remaining() {
			match reader.read_pbf_key().context("Failed to read PBF key")? {
				(3, WIRE_LEN) => {
					tile.layers.push(
						VectorTileLayer::read(
							reader
								.get_pbf_sub_reader()
								.context("Failed to get PBF sub-reader")?
								.as_mut(),
						)
						.with_context(|| format!("Failed to read layer #{}", tile.layers.len()))?,
					);
				}
				(f, w) => bail!("Unexpected combination of field number ({f}) and wire type ({w}) in tile"),
			}
		}

		Ok(tile)
	}

	pub fn to_blob(&self) -> Result<Blob> {
		let mut writer = ValueWriterBlob::new();

		for layer in &self.layers {
			writer.write_pbf_key(3, WIRE_LEN)?;
			writer
				.write_pbf_blob(&layer.to_blob()?)
				.with_context(|| format!("Failed to write layer '{}'", layer.name))?;
		}

		Ok(writer.into_blob())
	}

	#[must_use]
	pub fn find_layer(&self, name: &str) -> Option<&VectorTileLayer> {
		self.layers.iter().find(|layer| layer.name == name)
	}
}
