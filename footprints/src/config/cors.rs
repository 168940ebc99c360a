//! Cross-Origin Resource Sharing (CORS) configuration.
//!
//! Determines which browser origins may call the API. By default all origins are
//! allowed (`*`).
//!
//! # Example YAML
//! ```yaml
//! cors:
//!   allowed_origins:
//!     - "https://example.org"
//!     - "*.example.net"
//!   max_age_seconds: 86400
//! ```
use serde::Deserialize;
use std::time::Duration;

/// CORS policy configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
	/// Allowed origins for CORS requests. Supports:
	/// - `*` to allow all origins
	/// - Exact origins like `https://example.com`
	/// - Globs at the start of the domain like `*.example.com`
	/// - Globs at the end of the domain like `example.*`
	/// - Regular expressions enclosed in slashes like `/domain\..*$/`
	#[serde(default = "default_allowed_origins")]
	pub allowed_origins: Vec<String>,

	/// Optional duration for preflight cache in seconds
	#[serde(default)]
	pub max_age_seconds: Option<u64>,
}

fn default_allowed_origins() -> Vec<String> {
	vec!["*".to_string()]
}

impl Default for CorsConfig {
	fn default() -> Self {
		Self {
			allowed_origins: default_allowed_origins(),
			max_age_seconds: None,
		}
	}
}

impl CorsConfig {
	pub fn max_age(&self) -> Option<Duration> {
		self.max_age_seconds.map(Duration::from_secs)
	}
}
