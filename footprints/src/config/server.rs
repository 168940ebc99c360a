use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
	/// IP to bind to.
	#[serde()]
	pub ip: Option<String>,

	/// TCP port to bind to.
	#[serde()]
	pub port: Option<u16>,

	/// Directory with the map client, served for every path the API does not handle.
	#[serde()]
	pub static_dir: Option<PathBuf>,
}

impl ServerConfig {
	pub fn override_optional_ip(&mut self, ip: &Option<String>) {
		if ip.is_some() {
			self.ip = ip.clone();
		}
	}
	pub fn override_optional_port(&mut self, port: &Option<u16>) {
		if port.is_some() {
			self.port = *port;
		}
	}
	pub fn override_optional_static_dir(&mut self, static_dir: &Option<PathBuf>) {
		if static_dir.is_some() {
			self.static_dir = static_dir.clone();
		}
	}

	pub fn ip(&self) -> &str {
		self.ip.as_deref().unwrap_or("0.0.0.0")
	}

	pub fn port(&self) -> u16 {
		self.port.unwrap_or(8080)
	}
}
