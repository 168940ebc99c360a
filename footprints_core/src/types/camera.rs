//! Fitting a map camera to a bounding box.
//!
//! The fit is computed in normalized Web Mercator units (the whole world is one unit
//! wide), scaled by the tile size to obtain pixels at zoom 0.

use crate::{GeoBBox, GeoPoint};
use serde::{Deserialize, Serialize};

/// Zoom used for degenerate boxes and the upper bound of every suggested camera.
pub const MAX_CAMERA_ZOOM: f64 = 19.0;

/// Where a map should look and how close.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Camera {
	pub center: GeoPoint,
	pub zoom: f64,
}

/// Pixel dimensions of the map the camera is fitted into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
	pub width: u32,
	pub height: u32,
	/// Margin kept free on every side.
	pub padding: u32,
	/// Size of one tile in pixels at zoom 0.
	pub tile_size: u32,
}

impl Default for Viewport {
	fn default() -> Self {
		Viewport {
			width: 1024,
			height: 768,
			padding: 40,
			tile_size: 512,
		}
	}
}

impl Viewport {
	/// Drawable width and height after subtracting the padding, at least one pixel each.
	fn inner_size(&self) -> (f64, f64) {
		let inner = |size: u32| f64::from(size.saturating_sub(self.padding.saturating_mul(2)).max(1));
		(inner(self.width), inner(self.height))
	}
}

impl GeoBBox {
	/// Suggests a camera showing the whole bbox inside the padded viewport.
	///
	/// The center is the midpoint of the bbox. The zoom is the largest one at which the
	/// bbox still fits, clamped to `[0, 19]`. A bbox without extent gets zoom 19.
	#[must_use]
	pub fn suggested_camera(&self, viewport: &Viewport) -> Camera {
		let center = self.center();

		let [x0, y0] = self.min().to_mercator();
		let [x1, y1] = self.max().to_mercator();
		let span_x = (x1 - x0).abs();
		let span_y = (y1 - y0).abs();

		let (inner_width, inner_height) = viewport.inner_size();
		let world = f64::from(viewport.tile_size.max(1));

		let mut scale = f64::INFINITY;
		if span_x > 0.0 {
			scale = scale.min(inner_width / (span_x * world));
		}
		if span_y > 0.0 {
			scale = scale.min(inner_height / (span_y * world));
		}

		let zoom = if scale.is_finite() {
			scale.log2().clamp(0.0, MAX_CAMERA_ZOOM)
		} else {
			MAX_CAMERA_ZOOM
		};

		Camera { center, zoom }
	}
}
