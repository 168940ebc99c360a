use footprints_core::Viewport;
use serde::Deserialize;

/// What the map client is told at startup.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
	/// Style URL of the base map.
	pub style: String,
	pub width: u32,
	pub height: u32,
	pub padding: u32,
	pub tile_size: u32,
}

impl Default for ViewerConfig {
	fn default() -> Self {
		let viewport = Viewport::default();
		ViewerConfig {
			style: String::from("mapbox://styles/mapbox/streets-v12"),
			width: viewport.width,
			height: viewport.height,
			padding: viewport.padding,
			tile_size: viewport.tile_size,
		}
	}
}

impl ViewerConfig {
	pub fn viewport(&self) -> Viewport {
		Viewport {
			width: self.width,
			height: self.height,
			padding: self.padding,
			tile_size: self.tile_size,
		}
	}
}
