use super::{ClientConfig, MapViewer, Scene, SceneRecorder};
use crate::{
	config::Config,
	lookup::{Location, Lookup},
	upstream::Upstream,
};
use anyhow::{Result, anyhow};
use std::sync::Arc;

/// What a lookup starts from.
#[derive(Clone, Debug, PartialEq)]
pub enum LookupRequest {
	Query(String),
	Point { lat: f64, lon: f64 },
}

/// Runs the client pipeline without a screen and returns what would have been drawn.
///
/// Configuration, map construction, ready signal and layer setup happen strictly in this
/// order before the lookup result is shown.
pub async fn render_lookup(
	config: &Config,
	upstream: Arc<dyn Upstream>,
	request: &LookupRequest,
	zoom: Option<u8>,
) -> Result<Scene> {
	let client_config = ClientConfig::from_config(config);

	let mut viewer = MapViewer::new(SceneRecorder::default());
	viewer.initialize(&client_config)?;
	viewer.on_ready()?;

	let lookup = Lookup::new(upstream, &config.upstream, client_config.viewport);
	let outcome = match request {
		LookupRequest::Query(query) => lookup
			.lookup_query(query, zoom)
			.await?
			.ok_or_else(|| anyhow!("no location found for '{query}'"))?,
		LookupRequest::Point { lat, lon } => lookup.lookup_point(Location::at(*lat, *lon), zoom).await?,
	};

	viewer.show(&outcome)?;
	Ok(viewer.into_surface().into_scene())
}
