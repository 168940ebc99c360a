//! The building lookup pipeline.
//!
//! The free functions are the four steps of a lookup. [`Lookup`] chains them behind an
//! [`Upstream`]: position → tile address → remote tile → decoded buildings → camera.

use crate::{
	config::UpstreamConfig,
	upstream::{GeocodeCandidate, Upstream},
};
use footprints_core::{
	Blob, Camera, FootprintResult, GeoBBox, GeoPoint, MAX_CAMERA_ZOOM, TileCoord, Viewport,
};
use footprints_geometry::geo::GeoCollection;
use log::debug;
use serde::Serialize;
use std::sync::Arc;

/// Tile containing the position at `zoom`. Out of range positions are clamped onto the grid.
pub fn map_to_tile(lat: f64, lon: f64, zoom: u8) -> FootprintResult<TileCoord> {
	TileCoord::from_geo(lon, lat, zoom)
}

/// Buildings (or any other `category` layer) of a raw vector tile.
pub fn decode_tile(payload: Blob, tile: &TileCoord, category: &str) -> FootprintResult<GeoCollection> {
	footprints_geometry::decode_tile(payload, tile, category)
}

/// `None` if the collection has no coordinates at all.
pub fn bounding_box_of(collection: &GeoCollection) -> Option<GeoBBox> {
	collection.bounding_box()
}

pub fn suggested_camera(bbox: &GeoBBox, viewport: &Viewport) -> Camera {
	bbox.suggested_camera(viewport)
}

/// Where a lookup was made.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Location {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	pub center: GeoPoint,
}

impl Location {
	pub fn at(lat: f64, lon: f64) -> Location {
		Location {
			name: None,
			center: GeoPoint::new(lon, lat),
		}
	}
}

impl From<GeocodeCandidate> for Location {
	fn from(candidate: GeocodeCandidate) -> Self {
		Location {
			name: Some(candidate.name),
			center: candidate.center,
		}
	}
}

/// Everything a map client needs to show the result of one lookup.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LookupOutcome {
	pub location: Location,
	pub tile: TileCoord,
	/// Fitted to the buildings, or centered on the location if there are none.
	pub camera: Camera,
	pub buildings: GeoCollection,
}

#[derive(Debug)]
pub struct Lookup {
	upstream: Arc<dyn Upstream>,
	zoom: u8,
	category: String,
	viewport: Viewport,
}

impl Lookup {
	pub fn new(upstream: Arc<dyn Upstream>, config: &UpstreamConfig, viewport: Viewport) -> Lookup {
		Lookup {
			upstream,
			zoom: config.zoom,
			category: config.category.clone(),
			viewport,
		}
	}

	pub fn zoom(&self) -> u8 {
		self.zoom
	}

	pub fn category(&self) -> &str {
		&self.category
	}

	pub async fn geocode(&self, query: &str) -> FootprintResult<Vec<GeocodeCandidate>> {
		self.upstream.geocode(query).await
	}

	/// Fetches and decodes the tile containing the position.
	///
	/// A tile the upstream has no data for yields an empty collection.
	pub async fn buildings_at(
		&self,
		lat: f64,
		lon: f64,
		zoom: Option<u8>,
	) -> FootprintResult<(TileCoord, GeoCollection)> {
		let tile = map_to_tile(lat, lon, zoom.unwrap_or(self.zoom))?;

		let buildings = match self.upstream.fetch_tile(&tile).await? {
			Some(payload) => decode_tile(payload, &tile, &self.category)?,
			None => {
				debug!("upstream has no tile {tile}");
				GeoCollection::new()
			}
		};

		Ok((tile, buildings))
	}

	pub async fn lookup_point(&self, location: Location, zoom: Option<u8>) -> FootprintResult<LookupOutcome> {
		let (tile, buildings) = self
			.buildings_at(location.center.lat, location.center.lon, zoom)
			.await?;

		let camera = match bounding_box_of(&buildings) {
			Some(bbox) => suggested_camera(&bbox, &self.viewport),
			None => Camera {
				center: location.center,
				zoom: f64::from(tile.level).min(MAX_CAMERA_ZOOM),
			},
		};

		debug!(
			"lookup at {:?}: {} features in tile {tile}",
			location.center,
			buildings.len()
		);

		Ok(LookupOutcome {
			location,
			tile,
			camera,
			buildings,
		})
	}

	/// Geocodes `query` and looks up the best match. `None` if nothing was found.
	pub async fn lookup_query(&self, query: &str, zoom: Option<u8>) -> FootprintResult<Option<LookupOutcome>> {
		let Some(candidate) = self.geocode(query).await?.into_iter().next() else {
			debug!("no geocoding result for '{query}'");
			return Ok(None);
		};
		Ok(Some(self.lookup_point(Location::from(candidate), zoom).await?))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::MockUpstream;
	use approx::assert_abs_diff_eq;
	use footprints_core::FootprintError;
	use footprints_geometry::geo::{GeoValue, Geometry};
	use pretty_assertions::assert_eq;

	fn lookup(upstream: MockUpstream) -> (Arc<MockUpstream>, Lookup) {
		let upstream = Arc::new(upstream);
		let lookup = Lookup::new(upstream.clone(), &UpstreamConfig::default(), Viewport::default());
		(upstream, lookup)
	}

	#[test]
	fn map_to_tile_san_francisco() {
		let tile = map_to_tile(37.7749, -122.4194, 19).unwrap();
		assert_eq!(tile, TileCoord::new(19, 83857, 202648).unwrap());
		assert_eq!(map_to_tile(37.7749, -122.4194, 19).unwrap(), tile);
	}

	#[test]
	fn empty_collection_has_no_bbox() {
		assert_eq!(bounding_box_of(&GeoCollection::new()), None);
	}

	#[tokio::test]
	async fn buildings_at_decodes_building_layer() {
		let (upstream, lookup) = lookup(MockUpstream::with_buildings());
		let (tile, buildings) = lookup.buildings_at(37.7749, -122.4194, None).await.unwrap();

		assert_eq!(tile, TileCoord::new(16, 10482, 25331).unwrap());
		assert_eq!(upstream.requested(), vec![tile]);
		assert_eq!(buildings.len(), 1);

		let feature = buildings.iter().next().unwrap();
		assert_eq!(feature.category, "building");
		assert_eq!(feature.properties.get("height"), Some(&GeoValue::UInt(42)));
		assert!(matches!(feature.geometry, Geometry::Polygon(_)));

		let bounds = tile.to_geo_bbox();
		let bbox = bounding_box_of(&buildings).unwrap();
		assert!(bounds.contains(&bbox.min(), 1e-9));
		assert!(bounds.contains(&bbox.max(), 1e-9));
	}

	#[tokio::test]
	async fn zoom_override() {
		let (upstream, lookup) = lookup(MockUpstream::with_buildings());
		let (tile, _) = lookup.buildings_at(37.7749, -122.4194, Some(19)).await.unwrap();
		assert_eq!(tile, TileCoord::new(19, 83857, 202648).unwrap());
		assert_eq!(upstream.requested(), vec![tile]);
	}

	#[tokio::test]
	async fn missing_tile_is_empty() {
		let (_, lookup) = lookup(MockUpstream::default());
		let outcome = lookup.lookup_point(Location::at(52.52, 13.405), None).await.unwrap();
		assert!(outcome.buildings.is_empty());
		assert_eq!(
			outcome.camera,
			Camera {
				center: GeoPoint::new(13.405, 52.52),
				zoom: 16.0
			}
		);
	}

	#[tokio::test]
	async fn camera_fits_buildings() {
		let (_, lookup) = lookup(MockUpstream::with_buildings());
		let outcome = lookup.lookup_point(Location::at(37.7749, -122.4194), None).await.unwrap();
		let bbox = bounding_box_of(&outcome.buildings).unwrap();

		assert_abs_diff_eq!(outcome.camera.center.lon, bbox.center().lon, epsilon = 1e-12);
		assert_abs_diff_eq!(outcome.camera.center.lat, bbox.center().lat, epsilon = 1e-12);
		// half a tile at zoom 16 fits a 688 px high viewport at zoom ~17.4
		assert!(outcome.camera.zoom > 17.0 && outcome.camera.zoom < 18.0);
	}

	#[tokio::test]
	async fn invalid_coordinate_skips_upstream() {
		let (upstream, lookup) = lookup(MockUpstream::with_buildings());
		let err = lookup.buildings_at(f64::NAN, 13.4, None).await.unwrap_err();
		assert!(matches!(err, FootprintError::InvalidCoordinate { .. }));
		assert!(upstream.requested().is_empty());

		let err = lookup.buildings_at(52.5, 13.4, Some(32)).await.unwrap_err();
		assert!(matches!(err, FootprintError::InvalidCoordinate { .. }));
	}

	#[tokio::test]
	async fn upstream_failure_propagates() {
		let (_, lookup) = lookup(MockUpstream::failing(503));
		let err = lookup.lookup_query("Berlin", None).await.unwrap_err();
		assert!(err.is_retryable());
	}

	#[tokio::test]
	async fn corrupt_tile_is_decode_error() {
		let (_, lookup) = lookup(MockUpstream {
			tile: Some(Blob::from(vec![0x1au8, 0xff, 0x01])),
			..Default::default()
		});
		let err = lookup.buildings_at(37.7749, -122.4194, None).await.unwrap_err();
		assert_eq!(err.kind(), "decode_error");
	}

	#[tokio::test]
	async fn lookup_query_uses_first_candidate() {
		let (_, lookup) = lookup(MockUpstream::with_buildings());
		let outcome = lookup.lookup_query("San Francisco", None).await.unwrap().unwrap();
		assert_eq!(
			outcome.location.name.as_deref(),
			Some("San Francisco, California, United States")
		);
		assert_eq!(outcome.tile, TileCoord::new(16, 10482, 25331).unwrap());
		assert_eq!(outcome.buildings.len(), 1);
	}

	#[tokio::test]
	async fn lookup_query_without_match() {
		let (upstream, lookup) = lookup(MockUpstream {
			tile: Some(crate::test_utils::building_tile()),
			..Default::default()
		});
		assert_eq!(lookup.lookup_query("nowhere", None).await.unwrap(), None);
		assert!(upstream.requested().is_empty());
	}
}
