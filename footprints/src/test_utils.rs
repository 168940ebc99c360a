//! Fixtures shared by the unit tests: a synthetic building tile, an in-memory upstream
//! and a local HTTP server imitating the remote mapping API.

use crate::{
	config::Config,
	upstream::{GeocodeCandidate, Upstream},
};
use anyhow::Result;
use async_trait::async_trait;
use axum::{
	Json, Router,
	extract::{Path, Query},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::get,
};
use footprints_core::{Blob, FootprintError, FootprintResult, GeoPoint, TileCoord, compression::compress_gzip};
use footprints_geometry::{
	geo::{GeoProperties, GeoValue, Geometry},
	vector_tile::{VectorTile, VectorTileLayer},
};
use serde_json::json;
use std::{collections::HashMap, sync::Mutex};
use tokio::net::TcpListener;

pub const TEST_TOKEN: &str = "pk.test-token";

/// A tile with a road and one square building covering the middle of the tile.
pub fn building_tile() -> Blob {
	let mut buildings = VectorTileLayer::new_standard("building");
	let properties: GeoProperties = [("type", GeoValue::from("office")), ("height", GeoValue::UInt(42))]
		.into_iter()
		.collect();
	buildings
		.add_feature(
			&Geometry::Polygon(vec![vec![
				[1024.0, 1024.0],
				[3072.0, 1024.0],
				[3072.0, 3072.0],
				[1024.0, 3072.0],
				[1024.0, 1024.0],
			]]),
			&properties,
		)
		.unwrap();

	let mut roads = VectorTileLayer::new_standard("road");
	roads
		.add_feature(&Geometry::LineString(vec![[0.0, 2048.0], [4096.0, 2048.0]]), &GeoProperties::new())
		.unwrap();

	VectorTile::new(vec![roads, buildings]).to_blob().unwrap()
}

pub fn sf_candidate() -> GeocodeCandidate {
	GeocodeCandidate {
		name: "San Francisco, California, United States".to_string(),
		center: GeoPoint::new(-122.4194, 37.7749),
	}
}

/// In-memory [`Upstream`] that records the tiles it was asked for.
#[derive(Debug, Default)]
pub struct MockUpstream {
	pub tile: Option<Blob>,
	pub status: Option<u16>,
	pub candidates: Vec<GeocodeCandidate>,
	pub requested: Mutex<Vec<TileCoord>>,
}

impl MockUpstream {
	pub fn with_buildings() -> MockUpstream {
		MockUpstream {
			tile: Some(building_tile()),
			candidates: vec![sf_candidate()],
			..Default::default()
		}
	}

	pub fn failing(status: u16) -> MockUpstream {
		MockUpstream {
			status: Some(status),
			..Default::default()
		}
	}

	pub fn requested(&self) -> Vec<TileCoord> {
		self.requested.lock().unwrap().clone()
	}
}

#[async_trait]
impl Upstream for MockUpstream {
	async fn fetch_tile(&self, tile: &TileCoord) -> FootprintResult<Option<Blob>> {
		self.requested.lock().unwrap().push(*tile);
		if let Some(status) = self.status {
			return Err(FootprintError::upstream(
				format!("mock://{tile}"),
				Some(status),
				format!("HTTP {status}"),
			));
		}
		Ok(self.tile.clone())
	}

	async fn geocode(&self, _query: &str) -> FootprintResult<Vec<GeocodeCandidate>> {
		if let Some(status) = self.status {
			return Err(FootprintError::upstream("mock://geocode", Some(status), format!("HTTP {status}")));
		}
		Ok(self.candidates.clone())
	}
}

fn authorized(params: &HashMap<String, String>) -> bool {
	params.get("access_token").map(String::as_str) == Some(TEST_TOKEN)
}

/// `/v4/{tileset}/{z}/{x}/{y}.{format}`, behaviour depends on the tileset name.
async fn mock_tile(Path(path): Path<String>, Query(params): Query<HashMap<String, String>>) -> Response {
	if !authorized(&params) {
		return StatusCode::UNAUTHORIZED.into_response();
	}
	let tileset = path.split('/').next().unwrap_or_default();
	match tileset {
		"mock.buildings" => compress_gzip(&building_tile()).unwrap().into_vec().into_response(),
		"mock.plain" => building_tile().into_vec().into_response(),
		"mock.garbage" => vec![0x1au8, 0xff, 0x01].into_response(),
		"mock.broken" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
		_ => StatusCode::NOT_FOUND.into_response(),
	}
}

/// `/geocoding/v5/mapbox.places/{query}.json`
async fn mock_geocode(Path(query): Path<String>, Query(params): Query<HashMap<String, String>>) -> Response {
	if !authorized(&params) {
		return StatusCode::UNAUTHORIZED.into_response();
	}
	let limit: usize = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(5);
	let features = match query.trim_end_matches(".json") {
		"nowhere" => vec![],
		_ => vec![
			json!({"place_name": "San Francisco, California, United States", "center": [-122.4194, 37.7749], "relevance": 1}),
			json!({"place_name": "San Francisco, Córdoba, Argentina", "center": [-62.0833, -31.4333], "relevance": 0.9}),
		],
	};
	let features: Vec<_> = features.into_iter().take(limit).collect();
	Json(json!({"type": "FeatureCollection", "features": features})).into_response()
}

/// Serves the mock API on `127.0.0.1:port` and returns its base URL.
///
/// The server lives until the test runtime shuts down.
pub async fn spawn_mock_api(port: u16) -> Result<String> {
	let router = Router::new()
		.route("/v4/{*path}", get(mock_tile))
		.route("/geocoding/v5/mapbox.places/{*query}", get(mock_geocode));

	let listener = TcpListener::bind(("127.0.0.1", port)).await?;
	tokio::spawn(async move {
		if let Err(err) = axum::serve(listener, router.into_make_service()).await {
			log::error!("mock api exited with error: {err}");
		}
	});

	Ok(format!("http://127.0.0.1:{port}"))
}

/// Configuration pointing at a mock API started with [`spawn_mock_api`].
pub fn mock_config(base_url: &str, tileset: &str) -> Config {
	let mut config = Config::default();
	config.upstream.base_url = base_url.to_string();
	config.upstream.tileset = tileset.to_string();
	config.upstream.access_token = Some(TEST_TOKEN.to_string());
	config
}
