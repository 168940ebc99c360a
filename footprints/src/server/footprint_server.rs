//! HTTP server lifecycle.
//!
//! `handlers` implement the API, `routes` composes them into a `Router` and `cors`
//! builds the CORS layer. This file owns configuration ingestion, the global
//! protection middlewares, listening on a socket and graceful shutdown.

use super::{cors, handlers::ApiState, routes};
use crate::{
	config::{Config, CorsConfig},
	lookup::Lookup,
	upstream::{MapboxUpstream, Upstream},
	viewer::ClientConfig,
};
use anyhow::Result;
use axum::{
	BoxError, Router,
	error_handling::HandleErrorLayer,
	http::{HeaderValue, StatusCode, header::RETRY_AFTER},
	response::IntoResponse,
	routing::get,
};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::{net::TcpListener, sync::oneshot};
use tower::{
	ServiceBuilder, buffer::BufferLayer, limit::ConcurrencyLimitLayer, load_shed::LoadShedLayer, timeout::TimeoutLayer,
};
use tower_http::catch_panic::CatchPanicLayer;

/// The footprint proxy server.
///
/// - **Idempotent start/stop:** starting twice stops the previous instance; stopping twice is a no-op.
/// - **Graceful shutdown:** in-flight requests may finish (up to a timeout).
/// - **Backpressure:** global limits protect the process and the upstream from overload.
pub struct FootprintServer {
	ip: String,
	port: u16,
	static_dir: Option<PathBuf>,
	cors: CorsConfig,
	state: ApiState,
	/// One-shot channel to signal graceful shutdown to the serving task.
	exit_signal: Option<oneshot::Sender<()>>,
	/// Join handle for the serving task; awaited in `stop()`.
	join: Option<tokio::task::JoinHandle<()>>,
}

impl FootprintServer {
	/// Server talking to the upstream described by `config.upstream`.
	pub fn from_config(config: &Config) -> Result<FootprintServer> {
		let upstream = MapboxUpstream::new(&config.upstream)?;
		log::info!("upstream: {upstream:?}");
		Ok(FootprintServer::new(config, Arc::new(upstream)))
	}

	pub fn new(config: &Config, upstream: Arc<dyn Upstream>) -> FootprintServer {
		let lookup = Lookup::new(upstream, &config.upstream, config.viewer.viewport());
		FootprintServer {
			ip: config.server.ip().to_string(),
			port: config.server.port(),
			static_dir: config.server.static_dir.clone(),
			cors: config.cors.clone(),
			state: ApiState {
				lookup: Arc::new(lookup),
				client_config: Arc::new(ClientConfig::from_config(config)),
			},
			exit_signal: None,
			join: None,
		}
	}

	pub fn address(&self) -> String {
		format!("{}:{}", self.ip, self.port)
	}

	pub fn is_running(&self) -> bool {
		self.join.is_some()
	}

	/// Builds the complete application: routes, CORS and protection layers.
	pub fn build_router(&self) -> Result<Router> {
		let mut router = Router::new().route("/status", get(|| async { "ready!" }));
		router = routes::add_api_to_app(router, self.state.clone());
		router = routes::add_static_dir_to_app(router, self.static_dir.as_deref());

		let cors_layer = cors::build_cors_layer(&self.cors)?;
		router = router.layer(ServiceBuilder::new().layer(cors_layer));

		// Innermost to outermost:
		//   LoadShed → ConcurrencyLimit → Buffer → Timeout → CatchPanic → HandleError
		// `HandleErrorLayer` is outermost so Axum observes an `Infallible` error type.
		let global_concurrency = 256usize;
		let global_buffer = 512usize;
		let request_timeout = Duration::from_secs(15);

		let overload_handler = HandleErrorLayer::new(|err: BoxError| async move {
			log::warn!("rejecting request: {err}");
			let mut resp = (StatusCode::SERVICE_UNAVAILABLE, "Service overloaded, try later").into_response();
			resp.headers_mut().insert(RETRY_AFTER, HeaderValue::from_static("2"));
			Ok::<_, std::convert::Infallible>(resp)
		});

		let protection = ServiceBuilder::new()
			.layer(overload_handler)
			.layer(CatchPanicLayer::new())
			.layer(TimeoutLayer::new(request_timeout))
			.layer(BufferLayer::new(global_buffer))
			.layer(ConcurrencyLimitLayer::new(global_concurrency))
			.layer(LoadShedLayer::new());

		Ok(router.layer(protection))
	}

	/// Start listening and serving requests.
	///
	/// If already running, the previous instance is stopped first.
	pub async fn start(&mut self) -> Result<()> {
		if self.exit_signal.is_some() || self.join.is_some() {
			self.stop().await;
		}

		log::info!("starting server");
		let router = self.build_router()?;

		let addr = self.address();
		log::info!("server binding on {addr}");

		let listener = TcpListener::bind(&addr).await?;
		let (tx, rx) = oneshot::channel::<()>();

		let handle = tokio::spawn(async move {
			if let Err(err) = axum::serve(listener, router.into_make_service())
				.with_graceful_shutdown(async {
					rx.await.ok();
				})
				.await
			{
				log::error!("server task exited with error: {err}");
			}
		});

		self.exit_signal = Some(tx);
		self.join = Some(handle);

		Ok(())
	}

	/// Trigger graceful shutdown and wait for the server task to finish (with timeout).
	pub async fn stop(&mut self) {
		if self.exit_signal.is_none() && self.join.is_none() {
			return;
		}

		log::info!("stopping server");

		if let Some(tx) = self.exit_signal.take() {
			let _ = tx.send(());
		}

		if let Some(handle) = self.join.take() {
			match tokio::time::timeout(Duration::from_secs(10), handle).await {
				Ok(join_result) => {
					if let Err(join_err) = join_result {
						log::warn!("server task join error: {join_err}");
					}
				}
				Err(_) => {
					log::warn!("server task did not shutdown within timeout; continuing");
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::{MockUpstream, mock_config, spawn_mock_api};
	use axum::{
		body::{Body, to_bytes},
		http::{Request, header},
	};
	use footprints_core::TileCoord;
	use pretty_assertions::assert_eq;
	use serde_json::{Value, json};
	use std::io::Write;
	use tower::ServiceExt; // for `oneshot`

	const IP: &str = "127.0.0.1";

	fn server(upstream: MockUpstream) -> FootprintServer {
		FootprintServer::new(&Config::default(), Arc::new(upstream))
	}

	async fn call(server: &FootprintServer, uri: &str) -> (StatusCode, Value) {
		let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
		let resp = server.build_router().unwrap().oneshot(req).await.unwrap();
		let status = resp.status();
		let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
		let value = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()));
		(status, value)
	}

	#[tokio::test]
	async fn status() {
		let (status, body) = call(&server(MockUpstream::default()), "/status").await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body, Value::String("ready!".into()));
	}

	#[tokio::test]
	async fn client_config() {
		let (status, body) = call(&server(MockUpstream::default()), "/api/config").await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["style"], "mapbox://styles/mapbox/streets-v12");
		assert_eq!(body["maxZoom"], 19.0);
		assert_eq!(body["accessToken"], Value::Null);
	}

	#[tokio::test]
	async fn buildings_feature_collection() {
		let (status, body) = call(
			&server(MockUpstream::with_buildings()),
			"/api/buildings?lat=37.7749&lon=-122.4194&zoom=19",
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["type"], "FeatureCollection");
		assert_eq!(body["features"].as_array().unwrap().len(), 1);

		let feature = &body["features"][0];
		assert_eq!(feature["type"], "Feature");
		assert_eq!(feature["geometry"]["type"], "Polygon");
		assert_eq!(feature["properties"], json!({"height": 42, "type": "office"}));
		assert_eq!(body["bbox"].as_array().unwrap().len(), 4);
	}

	#[tokio::test]
	async fn buildings_without_data() {
		let (status, body) = call(&server(MockUpstream::default()), "/api/buildings?lat=52.52&lon=13.405").await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body, json!({"type": "FeatureCollection", "features": []}));
	}

	#[tokio::test]
	async fn bad_requests() {
		let server = server(MockUpstream::with_buildings());

		let (status, body) = call(&server, "/api/buildings?lat=abc&lon=13.4").await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "bad_request");

		let (status, body) = call(&server, "/api/buildings?lat=NaN&lon=13.4").await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "invalid_coordinate");

		let (status, body) = call(&server, "/api/buildings?lat=52.5&lon=13.4&zoom=32").await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "invalid_coordinate");

		let (status, _) = call(&server, "/api/lookup?lat=52.5").await;
		assert_eq!(status, StatusCode::BAD_REQUEST);

		let (status, _) = call(&server, "/api/geocode?q=%20").await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
	}

	#[tokio::test]
	async fn upstream_errors_are_bad_gateway() {
		let (status, body) = call(&server(MockUpstream::failing(503)), "/api/buildings?lat=52.52&lon=13.405").await;
		assert_eq!(status, StatusCode::BAD_GATEWAY);
		assert_eq!(body["error"], "upstream_unavailable");

		let garbage = MockUpstream {
			tile: Some(vec![0x1au8, 0xff].into()),
			..Default::default()
		};
		let (status, body) = call(&server(garbage), "/api/buildings?lat=52.52&lon=13.405").await;
		assert_eq!(status, StatusCode::BAD_GATEWAY);
		assert_eq!(body["error"], "decode_error");
	}

	#[tokio::test]
	async fn lookup_by_query() {
		let (status, body) = call(&server(MockUpstream::with_buildings()), "/api/lookup?q=San%20Francisco").await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(
			body["location"],
			json!({"name": "San Francisco, California, United States", "center": [-122.4194, 37.7749]})
		);
		assert_eq!(body["tile"], json!({"z": 16, "x": 10482, "y": 25331}));
		assert_eq!(body["buildings"]["features"].as_array().unwrap().len(), 1);
		assert!(body["camera"]["zoom"].as_f64().unwrap() > 16.0);
	}

	#[tokio::test]
	async fn lookup_without_match() {
		let (status, body) = call(&server(MockUpstream::default()), "/api/lookup?q=nowhere").await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body["error"], "not_found");
		assert_eq!(body["message"], "no location found for 'nowhere'");
	}

	#[tokio::test]
	async fn geocode() {
		let (status, body) = call(&server(MockUpstream::with_buildings()), "/api/geocode?q=sf").await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(
			body,
			json!([{"name": "San Francisco, California, United States", "center": [-122.4194, 37.7749]}])
		);
	}

	#[tokio::test]
	async fn unknown_path() {
		let (status, body) = call(&server(MockUpstream::default()), "/nothing/here").await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body, Value::String("Not Found".into()));
	}

	#[tokio::test]
	async fn static_client() {
		let dir = tempfile::tempdir().unwrap();
		let mut file = std::fs::File::create(dir.path().join("index.html")).unwrap();
		write!(file, "<html>map</html>").unwrap();

		let mut config = Config::default();
		config.server.static_dir = Some(dir.path().to_path_buf());
		let server = FootprintServer::new(&config, Arc::new(MockUpstream::default()));

		let req = Request::builder().uri("/").body(Body::empty()).unwrap();
		let resp = server.build_router().unwrap().oneshot(req).await.unwrap();
		assert_eq!(resp.status(), StatusCode::OK);
		assert!(
			resp.headers()[header::CONTENT_TYPE]
				.to_str()
				.unwrap()
				.starts_with("text/html")
		);
		let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
		assert_eq!(&bytes[..], b"<html>map</html>");

		let (status, _) = call(&server, "/api/config").await;
		assert_eq!(status, StatusCode::OK);
	}

	#[tokio::test]
	async fn server_lifecycle() -> Result<()> {
		async fn get(path: &str) -> (u16, String) {
			let resp = reqwest::get(format!("http://{IP}:50102/{path}"))
				.await
				.expect("should have made a get request");
			let status = resp.status().as_u16();
			(status, resp.text().await.expect("should have returned text"))
		}

		let base_url = spawn_mock_api(50101).await?;
		let mut config = mock_config(&base_url, "mock.buildings");
		config.server.ip = Some(IP.to_string());
		config.server.port = Some(50102);

		let mut server = FootprintServer::from_config(&config)?;
		assert!(!server.is_running());
		server.start().await?;
		assert!(server.is_running());

		assert_eq!(get("status").await, (200, "ready!".to_string()));

		let (status, text) = get("api/lookup?q=San%20Francisco").await;
		assert_eq!(status, 200);
		let body: Value = serde_json::from_str(&text)?;
		let tile = TileCoord::from_geo(-122.4194, 37.7749, 16)?;
		assert_eq!(body["tile"], serde_json::to_value(tile)?);
		assert_eq!(body["buildings"]["features"].as_array().unwrap().len(), 1);

		// starting again restarts on the same port
		server.start().await?;
		assert_eq!(get("status").await.0, 200);

		server.stop().await;
		assert!(!server.is_running());
		server.stop().await;

		Ok(())
	}

	#[tokio::test]
	async fn upstream_garbage_over_http() -> Result<()> {
		let base_url = spawn_mock_api(50103).await?;
		let mut config = mock_config(&base_url, "mock.garbage");
		config.server.ip = Some(IP.to_string());
		config.server.port = Some(50104);

		let mut server = FootprintServer::from_config(&config)?;
		server.start().await?;

		let resp = reqwest::get(format!("http://{IP}:50104/api/buildings?lat=37.7749&lon=-122.4194")).await?;
		assert_eq!(resp.status().as_u16(), 502);
		let body: Value = serde_json::from_str(&resp.text().await?)?;
		assert_eq!(body["error"], "decode_error");

		server.stop().await;
		Ok(())
	}
}
