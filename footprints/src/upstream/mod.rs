//! Access to the remote mapping service.
//!
//! The lookup pipeline only talks to the [`Upstream`] trait, so tests and alternative
//! providers can stand in for [`MapboxUpstream`].

mod mapbox;

pub use mapbox::MapboxUpstream;

use async_trait::async_trait;
use footprints_core::{Blob, FootprintResult, GeoPoint, TileCoord};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A place found by free-text geocoding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCandidate {
	pub name: String,
	/// Representative position, serialized as `[lon, lat]`.
	pub center: GeoPoint,
}

#[async_trait]
pub trait Upstream: Debug + Send + Sync {
	/// Fetches the raw vector tile at `tile`.
	///
	/// `Ok(None)` means the service has no data for this tile (404/204).
	async fn fetch_tile(&self, tile: &TileCoord) -> FootprintResult<Option<Blob>>;

	/// Resolves a free-text query into candidate places, best match first.
	async fn geocode(&self, query: &str) -> FootprintResult<Vec<GeocodeCandidate>>;
}
