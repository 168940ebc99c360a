//! Router composition. Wires handlers into an Axum `Router` without lifecycle or CORS logic.

use super::handlers::{ApiState, serve_buildings, serve_config, serve_geocode, serve_lookup, serve_not_found};
use axum::{Router, routing::get};
use std::path::Path;
use tower_http::services::ServeDir;

/// Attach the JSON API under `/api/`.
pub fn add_api_to_app(app: Router, state: ApiState) -> Router {
	let api_app = Router::new()
		.route("/api/config", get(serve_config))
		.route("/api/geocode", get(serve_geocode))
		.route("/api/buildings", get(serve_buildings))
		.route("/api/lookup", get(serve_lookup))
		.with_state(state);
	app.merge(api_app)
}

/// Serve the map client from `dir` for every path not handled otherwise.
pub fn add_static_dir_to_app(app: Router, dir: Option<&Path>) -> Router {
	match dir {
		Some(dir) => app.fallback_service(ServeDir::new(dir)),
		None => app.fallback(serve_not_found),
	}
}
