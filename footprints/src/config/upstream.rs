//! Settings of the remote mapping service that delivers vector tiles and geocoding results.
//!
//! URLs follow the Mapbox layout:
//! - tiles: `{base_url}/v4/{tileset}/{z}/{x}/{y}.{format}?access_token=…`
//! - geocoding: `{base_url}/geocoding/v5/mapbox.places/{query}.json?access_token=…&limit=…`

use anyhow::{Result, ensure};
use footprints_core::MAX_LEVEL;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct UpstreamConfig {
	/// Scheme and host of the mapping API, without trailing slash.
	pub base_url: String,

	/// Access token appended to every request. Usually taken from `MAPBOX_ACCESS_TOKEN`.
	pub access_token: Option<String>,

	pub tileset: String,

	/// File extension of the tile endpoint.
	pub format: String,

	/// Zoom level at which buildings are looked up.
	pub zoom: u8,

	/// Name of the vector tile layer holding the footprints.
	pub category: String,

	pub timeout_seconds: u64,

	/// Maximum number of geocoding candidates requested.
	pub geocode_limit: u32,
}

impl Default for UpstreamConfig {
	fn default() -> Self {
		UpstreamConfig {
			base_url: String::from("https://api.mapbox.com"),
			access_token: None,
			tileset: String::from("mapbox.mapbox-streets-v8"),
			format: String::from("mvt"),
			zoom: 16,
			category: String::from("building"),
			timeout_seconds: 10,
			geocode_limit: 5,
		}
	}
}

impl UpstreamConfig {
	pub fn override_optional_access_token(&mut self, access_token: &Option<String>) {
		if access_token.is_some() {
			self.access_token = access_token.clone();
		}
	}

	pub fn override_optional_zoom(&mut self, zoom: &Option<u8>) {
		if let Some(zoom) = zoom {
			self.zoom = *zoom;
		}
	}

	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_seconds)
	}

	pub fn validate(&self) -> Result<()> {
		ensure!(
			self.base_url.starts_with("http://") || self.base_url.starts_with("https://"),
			"upstream.base_url must be an http(s) URL, got '{}'",
			self.base_url
		);
		ensure!(
			self.zoom <= MAX_LEVEL,
			"upstream.zoom must be <= {MAX_LEVEL}, got {}",
			self.zoom
		);
		ensure!(self.timeout_seconds > 0, "upstream.timeout_seconds must be positive");
		ensure!(!self.tileset.is_empty(), "upstream.tileset must not be empty");
		ensure!(!self.category.is_empty(), "upstream.category must not be empty");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn defaults_are_valid() {
		let config = UpstreamConfig::default();
		config.validate().unwrap();
		assert_eq!(config.zoom, 16);
		assert_eq!(config.category, "building");
		assert_eq!(config.timeout(), Duration::from_secs(10));
	}

	#[rstest]
	#[case::base_url(UpstreamConfig { base_url: "ftp://example.org".into(), ..Default::default() }, "base_url")]
	#[case::zoom(UpstreamConfig { zoom: 32, ..Default::default() }, "zoom")]
	#[case::timeout(UpstreamConfig { timeout_seconds: 0, ..Default::default() }, "timeout_seconds")]
	#[case::category(UpstreamConfig { category: String::new(), ..Default::default() }, "category")]
	fn invalid(#[case] config: UpstreamConfig, #[case] field: &str) {
		let err = config.validate().unwrap_err().to_string();
		assert!(err.contains(field), "{err}");
	}

	#[test]
	fn overrides() {
		let mut config = UpstreamConfig::default();
		config.override_optional_access_token(&Some("pk.abc".into()));
		config.override_optional_zoom(&None);
		assert_eq!(config.access_token.as_deref(), Some("pk.abc"));
		assert_eq!(config.zoom, 16);
		config.override_optional_zoom(&Some(18));
		assert_eq!(config.zoom, 18);
	}
}
