//! From a raw tile payload to the features of one layer.

use crate::{geo::GeoCollection, vector_tile::VectorTile};
use anyhow::Context;
use footprints_core::{Blob, FootprintError, FootprintResult, TileCoord, compression::decompress_if_gzip};
use log::debug;

/// Decodes `payload`, the vector tile at `tile`, and collects the features of layer `category`.
///
/// Gzip-compressed payloads are inflated first. A tile without that layer yields an empty
/// collection. Any malformed part of the payload fails the whole tile with
/// [`FootprintError::Decode`]; partial results are never returned.
pub fn decode_tile(payload: Blob, tile: &TileCoord, category: &str) -> FootprintResult<GeoCollection> {
	decode(payload, tile, category).map_err(|err| FootprintError::decode(*tile, &err))
}

fn decode(payload: Blob, tile: &TileCoord, category: &str) -> anyhow::Result<GeoCollection> {
	let payload = decompress_if_gzip(payload)?;
	let vector_tile = VectorTile::from_blob(&payload).context("Failed to parse vector tile")?;

	let Some(layer) = vector_tile.find_layer(category) else {
		debug!(
			"tile {tile} has no layer '{category}', found {:?}",
			vector_tile.layers.iter().map(|l| l.name.as_str()).collect::<Vec<_>>()
		);
		return Ok(GeoCollection::new());
	};

	let features = layer
		.to_features(tile)
		.with_context(|| format!("Failed to decode layer '{category}'"))?;
	debug!("tile {tile}: decoded {} features from layer '{category}'", features.len());

	Ok(GeoCollection::from(features))
}
