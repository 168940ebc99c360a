use super::{CorsConfig, ServerConfig, UpstreamConfig, ViewerConfig};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
	fs::File,
	io::{BufReader, Read},
	path::Path,
};

/// Environment variable holding the access token of the mapping API.
pub const ACCESS_TOKEN_ENV: &str = "MAPBOX_ACCESS_TOKEN";

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
	/// HTTP server configuration
	#[serde(default)]
	pub server: ServerConfig,

	/// Cross-Origin Resource Sharing (CORS) settings
	#[serde(default)]
	pub cors: CorsConfig,

	/// Remote tile and geocoding service
	#[serde(default)]
	pub upstream: UpstreamConfig,

	/// Map client settings
	#[serde(default)]
	pub viewer: ViewerConfig,
}

impl Config {
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		Ok(serde_yaml_ng::from_reader(reader)?)
	}

	pub fn from_string(text: &str) -> Result<Self> {
		Ok(serde_yaml_ng::from_str(text)?)
	}

	pub fn from_path(path: &Path) -> Result<Self> {
		let file = File::open(path).with_context(|| format!("Failed to open config file {path:?}"))?;
		let config =
			Config::from_reader(BufReader::new(file)).with_context(|| format!("Failed to parse config file {path:?}"))?;
		config.validate()?;
		Ok(config)
	}

	/// Loads `path` if given, otherwise starts from the defaults.
	pub fn from_optional_path(path: Option<&Path>) -> Result<Self> {
		match path {
			Some(path) => Config::from_path(path),
			None => Ok(Config::default()),
		}
	}

	/// Applies environment variables on top of the file values, reading them through `lookup`.
	pub fn apply_env_with<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
		if let Some(token) = lookup(ACCESS_TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
			log::debug!("using access token from {ACCESS_TOKEN_ENV}");
			self.upstream.access_token = Some(token);
		}
	}

	pub fn apply_env(&mut self) {
		self.apply_env_with(|key| std::env::var(key).ok());
	}

	pub fn validate(&self) -> Result<()> {
		self.upstream.validate()
	}
}
