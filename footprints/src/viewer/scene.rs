use super::{ClientConfig, LayerSpec, MapSurface};
use anyhow::{Result, anyhow, bail};
use footprints_core::{Camera, GeoPoint};
use footprints_geometry::geo::GeoCollection;
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything drawn on a [`SceneRecorder`].
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Scene {
	pub style: Option<String>,
	pub sources: BTreeMap<String, GeoCollection>,
	pub layers: Vec<LayerSpec>,
	pub markers: Vec<GeoPoint>,
	pub camera: Option<Camera>,
}

/// Headless [`MapSurface`] used by the `lookup` command and in tests.
#[derive(Debug, Default)]
pub struct SceneRecorder {
	scene: Scene,
	broken: Option<String>,
}

impl SceneRecorder {
	/// A surface whose map construction always fails with `reason`.
	pub fn broken(reason: &str) -> SceneRecorder {
		SceneRecorder {
			broken: Some(reason.to_string()),
			..Default::default()
		}
	}

	pub fn scene(&self) -> &Scene {
		&self.scene
	}

	pub fn into_scene(self) -> Scene {
		self.scene
	}
}

impl MapSurface for SceneRecorder {
	fn create(&mut self, config: &ClientConfig) -> Result<()> {
		if let Some(reason) = &self.broken {
			return Err(anyhow!("{reason}"));
		}
		self.scene = Scene {
			style: Some(config.style.clone()),
			..Default::default()
		};
		Ok(())
	}

	fn add_source(&mut self, id: &str, data: &GeoCollection) -> Result<()> {
		if self.scene.sources.contains_key(id) {
			bail!("source '{id}' already exists");
		}
		self.scene.sources.insert(id.to_string(), data.clone());
		Ok(())
	}

	fn set_source_data(&mut self, id: &str, data: &GeoCollection) -> Result<()> {
		let Some(source) = self.scene.sources.get_mut(id) else {
			bail!("source '{id}' does not exist");
		};
		*source = data.clone();
		Ok(())
	}

	fn add_layer(&mut self, layer: &LayerSpec) -> Result<()> {
		if !self.scene.sources.contains_key(&layer.source) {
			bail!("layer '{}' refers to unknown source '{}'", layer.id, layer.source);
		}
		if self.scene.layers.iter().any(|l| l.id == layer.id) {
			bail!("layer '{}' already exists", layer.id);
		}
		self.scene.layers.push(layer.clone());
		Ok(())
	}

	fn place_marker(&mut self, position: GeoPoint) -> Result<()> {
		self.scene.markers.push(position);
		Ok(())
	}

	fn fly_to(&mut self, camera: &Camera) -> Result<()> {
		self.scene.camera = Some(*camera);
		Ok(())
	}
}
