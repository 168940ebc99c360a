use super::{GeocodeCandidate, Upstream};
use crate::config::UpstreamConfig;
use anyhow::Result;
use async_trait::async_trait;
use footprints_core::{Blob, FootprintError, FootprintResult, GeoPoint, TileCoord};
use log::{debug, warn};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt::{Debug, Formatter};

/// Client for Mapbox compatible tile and geocoding endpoints.
pub struct MapboxUpstream {
	client: Client,
	base_url: String,
	access_token: Option<String>,
	tileset: String,
	format: String,
	geocode_limit: u32,
}

#[derive(Deserialize)]
struct GeocodeResponse {
	#[serde(default)]
	features: Vec<GeocodeFeature>,
}

#[derive(Deserialize)]
struct GeocodeFeature {
	place_name: String,
	center: GeoPoint,
}

impl MapboxUpstream {
	pub fn new(config: &UpstreamConfig) -> Result<MapboxUpstream> {
		config.validate()?;

		let client = Client::builder()
			.timeout(config.timeout())
			.user_agent(concat!("footprints/", env!("CARGO_PKG_VERSION")))
			.use_rustls_tls()
			.build()?;

		if config.access_token.is_none() {
			warn!("no access token configured, the upstream service will probably reject all requests");
		}

		Ok(MapboxUpstream {
			client,
			base_url: config.base_url.trim_end_matches('/').to_string(),
			access_token: config.access_token.clone(),
			tileset: config.tileset.clone(),
			format: config.format.clone(),
			geocode_limit: config.geocode_limit,
		})
	}

	/// Tile URL without the access token.
	pub fn tile_url(&self, tile: &TileCoord) -> String {
		format!(
			"{}/v4/{}/{}/{}/{}.{}",
			self.base_url, self.tileset, tile.level, tile.x, tile.y, self.format
		)
	}

	/// Geocoding URL without the access token.
	pub fn geocode_url(&self, query: &str) -> String {
		format!(
			"{}/geocoding/v5/mapbox.places/{}.json",
			self.base_url,
			utf8_percent_encode(query, NON_ALPHANUMERIC)
		)
	}

	/// Issues a GET request. 404 and 204 are reported as `None`.
	async fn get(&self, url: &str, params: &[(&str, String)]) -> FootprintResult<Option<Blob>> {
		let mut request = self.client.get(url);
		if let Some(token) = &self.access_token {
			request = request.query(&[("access_token", token)]);
		}
		request = request.query(params);

		// `without_url` keeps the access token out of messages and logs
		let response = request.send().await.map_err(|err| {
			let status = err.status().map(|s| s.as_u16());
			let err = FootprintError::upstream(url, status, format!("{:#}", anyhow::Error::from(err.without_url())));
			warn!("{err}");
			err
		})?;

		let status = response.status();
		if status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT {
			debug!("no data at {url} ({status})");
			return Ok(None);
		}
		if !status.is_success() {
			let err = FootprintError::upstream(url, Some(status.as_u16()), format!("HTTP {status}"));
			warn!("{err}");
			return Err(err);
		}

		let bytes = response.bytes().await.map_err(|err| {
			FootprintError::upstream(
				url,
				Some(status.as_u16()),
				format!("{:#}", anyhow::Error::from(err.without_url())),
			)
		})?;

		Ok(Some(Blob::from(bytes.to_vec())))
	}
}

#[async_trait]
impl Upstream for MapboxUpstream {
	async fn fetch_tile(&self, tile: &TileCoord) -> FootprintResult<Option<Blob>> {
		let url = self.tile_url(tile);
		debug!("fetch tile {tile} from {url}");
		self.get(&url, &[]).await
	}

	async fn geocode(&self, query: &str) -> FootprintResult<Vec<GeocodeCandidate>> {
		let query = query.trim();
		if query.is_empty() {
			return Ok(Vec::new());
		}

		let url = self.geocode_url(query);
		debug!("geocode '{query}'");
		let Some(body) = self.get(&url, &[("limit", self.geocode_limit.to_string())]).await? else {
			return Ok(Vec::new());
		};

		let response: GeocodeResponse = serde_json::from_slice(body.as_slice())
			.map_err(|err| FootprintError::upstream(&url, Some(200), format!("invalid geocoding response: {err}")))?;

		Ok(response
			.features
			.into_iter()
			.map(|f| GeocodeCandidate {
				name: f.place_name,
				center: f.center,
			})
			.collect())
	}
}

impl Debug for MapboxUpstream {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MapboxUpstream")
			.field("base_url", &self.base_url)
			.field("tileset", &self.tileset)
			.field("format", &self.format)
			.field("access_token", &self.access_token.as_ref().map(|_| "***"))
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::{TEST_TOKEN, spawn_mock_api};
	use pretty_assertions::assert_eq;

	fn upstream(base_url: &str, tileset: &str) -> MapboxUpstream {
		MapboxUpstream::new(&UpstreamConfig {
			base_url: base_url.to_string(),
			access_token: Some(TEST_TOKEN.to_string()),
			tileset: tileset.to_string(),
			..Default::default()
		})
		.unwrap()
	}

	fn sf() -> TileCoord {
		TileCoord::new(16, 10482, 25331).unwrap()
	}

	#[test]
	fn urls() {
		let u = upstream("https://api.example.org/", "mapbox.mapbox-streets-v8");
		assert_eq!(
			u.tile_url(&sf()),
			"https://api.example.org/v4/mapbox.mapbox-streets-v8/16/10482/25331.mvt"
		);
		assert_eq!(
			u.geocode_url("San Francisco, CA"),
			"https://api.example.org/geocoding/v5/mapbox.places/San%20Francisco%2C%20CA.json"
		);
	}

	#[test]
	fn debug_hides_token() {
		let text = format!("{:?}", upstream("https://api.example.org", "t"));
		assert!(!text.contains(TEST_TOKEN));
		assert!(text.contains("***"));
	}

	#[test]
	fn rejects_invalid_config() {
		let config = UpstreamConfig {
			base_url: "api.example.org".to_string(),
			..Default::default()
		};
		assert!(MapboxUpstream::new(&config).is_err());
	}

	#[tokio::test]
	async fn fetch_tiles_from_mock_api() -> Result<()> {
		let base_url = spawn_mock_api(50201).await?;

		let tile = upstream(&base_url, "mock.buildings").fetch_tile(&sf()).await?;
		assert!(tile.is_some_and(|blob| !blob.is_empty()));

		let tile = upstream(&base_url, "mock.empty").fetch_tile(&sf()).await?;
		assert_eq!(tile, None);

		let err = upstream(&base_url, "mock.broken").fetch_tile(&sf()).await.unwrap_err();
		match &err {
			FootprintError::UpstreamUnavailable { url, status, .. } => {
				assert_eq!(status, &Some(500));
				assert_eq!(url, &format!("{base_url}/v4/mock.broken/16/10482/25331.mvt"));
			}
			_ => panic!("unexpected error {err}"),
		}
		assert!(!err.to_string().contains(TEST_TOKEN));

		Ok(())
	}

	#[tokio::test]
	async fn wrong_token_is_upstream_error() -> Result<()> {
		let base_url = spawn_mock_api(50202).await?;
		let u = MapboxUpstream::new(&UpstreamConfig {
			base_url: base_url.clone(),
			access_token: Some("pk.wrong".to_string()),
			tileset: "mock.buildings".to_string(),
			..Default::default()
		})?;
		let err = u.fetch_tile(&sf()).await.unwrap_err();
		assert!(err.is_retryable());
		assert!(err.to_string().ends_with("HTTP 401 Unauthorized"), "{err}");
		Ok(())
	}

	#[tokio::test]
	async fn geocode_from_mock_api() -> Result<()> {
		let base_url = spawn_mock_api(50203).await?;
		let u = upstream(&base_url, "mock.buildings");

		let candidates = u.geocode("San Francisco").await?;
		assert_eq!(
			candidates,
			vec![
				GeocodeCandidate {
					name: "San Francisco, California, United States".to_string(),
					center: GeoPoint::new(-122.4194, 37.7749),
				},
				GeocodeCandidate {
					name: "San Francisco, Córdoba, Argentina".to_string(),
					center: GeoPoint::new(-62.0833, -31.4333),
				},
			]
		);

		assert_eq!(u.geocode("nowhere").await?, vec![]);
		assert_eq!(u.geocode("   ").await?, vec![]);
		Ok(())
	}

	#[tokio::test]
	async fn unreachable_upstream() {
		let u = upstream("http://127.0.0.1:9", "mock.buildings");
		let err = u.fetch_tile(&sf()).await.unwrap_err();
		assert_eq!(err.kind(), "upstream_unavailable");
	}
}
