//! The map client as an explicit state machine.
//!
//! Setup is linear: fetch the [`ClientConfig`], construct the map, wait until the map
//! reports it is ready, then attach the building source and its layers. Everything that
//! draws requires [`ViewerState::Ready`].
//!
//! The actual rendering is delegated to a [`MapSurface`]. [`SceneRecorder`] is a headless
//! surface that records what would have been drawn.

mod headless;
mod scene;

pub use headless::{LookupRequest, render_lookup};
pub use scene::{Scene, SceneRecorder};

use crate::{config::Config, lookup::LookupOutcome};
use anyhow::{Result, bail};
use footprints_core::{Camera, GeoPoint, MAX_CAMERA_ZOOM, Viewport};
use footprints_geometry::geo::GeoCollection;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Source id of the building footprints.
pub const BUILDINGS_SOURCE: &str = "buildings";

/// Bootstrap data a map client needs before it can construct the map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
	pub access_token: Option<String>,
	pub style: String,
	pub max_zoom: f64,
	pub viewport: Viewport,
}

impl ClientConfig {
	pub fn from_config(config: &Config) -> ClientConfig {
		ClientConfig {
			access_token: config.upstream.access_token.clone(),
			style: config.viewer.style.clone(),
			max_zoom: MAX_CAMERA_ZOOM,
			viewport: config.viewer.viewport(),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
	Fill,
	Line,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LayerSpec {
	pub id: String,
	pub source: String,
	pub kind: LayerKind,
	pub color: String,
	pub opacity: f64,
}

/// Rendering collaborator driven by [`MapViewer`].
pub trait MapSurface {
	/// Starts constructing the map. Readiness is reported later via [`MapViewer::on_ready`].
	fn create(&mut self, config: &ClientConfig) -> Result<()>;
	fn add_source(&mut self, id: &str, data: &GeoCollection) -> Result<()>;
	fn set_source_data(&mut self, id: &str, data: &GeoCollection) -> Result<()>;
	fn add_layer(&mut self, layer: &LayerSpec) -> Result<()>;
	fn place_marker(&mut self, position: GeoPoint) -> Result<()>;
	fn fly_to(&mut self, camera: &Camera) -> Result<()>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewerState {
	Uninitialized,
	Loading,
	Ready,
	Failed(String),
}

impl Display for ViewerState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ViewerState::Uninitialized => f.write_str("uninitialized"),
			ViewerState::Loading => f.write_str("loading"),
			ViewerState::Ready => f.write_str("ready"),
			ViewerState::Failed(reason) => write!(f, "failed ({reason})"),
		}
	}
}

fn building_layers() -> [LayerSpec; 2] {
	[
		LayerSpec {
			id: String::from("buildings-fill"),
			source: String::from(BUILDINGS_SOURCE),
			kind: LayerKind::Fill,
			color: String::from("#e6550d"),
			opacity: 0.5,
		},
		LayerSpec {
			id: String::from("buildings-outline"),
			source: String::from(BUILDINGS_SOURCE),
			kind: LayerKind::Line,
			color: String::from("#a63603"),
			opacity: 1.0,
		},
	]
}

pub struct MapViewer<M: MapSurface> {
	surface: M,
	state: ViewerState,
}

impl<M: MapSurface> MapViewer<M> {
	pub fn new(surface: M) -> MapViewer<M> {
		MapViewer {
			surface,
			state: ViewerState::Uninitialized,
		}
	}

	pub fn state(&self) -> &ViewerState {
		&self.state
	}

	pub fn surface(&self) -> &M {
		&self.surface
	}

	pub fn into_surface(self) -> M {
		self.surface
	}

	/// Constructs the map. Allowed when uninitialized or after a failure.
	pub fn initialize(&mut self, config: &ClientConfig) -> Result<()> {
		match self.state {
			ViewerState::Uninitialized | ViewerState::Failed(_) => {}
			_ => bail!("cannot initialize map viewer in state {}", self.state),
		}

		self.state = ViewerState::Loading;
		log::debug!("map viewer loading");
		if let Err(err) = self.surface.create(config) {
			self.fail(&err);
			return Err(err.context("Failed to create map"));
		}
		Ok(())
	}

	/// The map finished loading: attach the building source and its layers.
	pub fn on_ready(&mut self) -> Result<()> {
		if self.state != ViewerState::Loading {
			bail!("map viewer got a ready signal in state {}", self.state);
		}

		if let Err(err) = self.attach_buildings() {
			self.fail(&err);
			return Err(err.context("Failed to attach building layers"));
		}

		self.state = ViewerState::Ready;
		log::debug!("map viewer ready");
		Ok(())
	}

	/// Map construction or loading failed.
	pub fn fail(&mut self, reason: impl Display) {
		log::warn!("map viewer failed: {reason}");
		self.state = ViewerState::Failed(reason.to_string());
	}

	fn attach_buildings(&mut self) -> Result<()> {
		self.surface.add_source(BUILDINGS_SOURCE, &GeoCollection::new())?;
		for layer in building_layers() {
			self.surface.add_layer(&layer)?;
		}
		Ok(())
	}

	fn ensure_ready(&self) -> Result<()> {
		if self.state != ViewerState::Ready {
			bail!("map viewer is not ready (state: {})", self.state);
		}
		Ok(())
	}

	pub fn show_buildings(&mut self, buildings: &GeoCollection) -> Result<()> {
		self.ensure_ready()?;
		self.surface.set_source_data(BUILDINGS_SOURCE, buildings)
	}

	/// Displays the result of a lookup: buildings, a marker at the location and the camera.
	pub fn show(&mut self, outcome: &LookupOutcome) -> Result<()> {
		self.ensure_ready()?;
		self.surface.set_source_data(BUILDINGS_SOURCE, &outcome.buildings)?;
		self.surface.place_marker(outcome.location.center)?;
		self.surface.fly_to(&outcome.camera)
	}
}
