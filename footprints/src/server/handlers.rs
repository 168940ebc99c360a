//! HTTP handlers of the JSON API and small response helpers.
//!
//! Note: CORS headers are handled exclusively by the `CorsLayer`.

use crate::{
	lookup::{Location, Lookup, LookupOutcome},
	upstream::GeocodeCandidate,
	viewer::ClientConfig,
};
use axum::{
	Json,
	body::Body,
	extract::{Query, State, rejection::QueryRejection},
	http::{StatusCode, Uri, header},
	response::{IntoResponse, Response},
};
use footprints_core::FootprintError;
use footprints_geometry::geo::GeoCollection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared, immutable state of the API routes.
#[derive(Clone, Debug)]
pub struct ApiState {
	pub lookup: Arc<Lookup>,
	pub client_config: Arc<ClientConfig>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
	pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct BuildingsQuery {
	pub lat: f64,
	pub lon: f64,
	pub zoom: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
	pub q: Option<String>,
	pub lat: Option<f64>,
	pub lon: Option<f64>,
	pub zoom: Option<u8>,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
	error: &'a str,
	message: String,
}

/// Everything that can go wrong in an API request.
#[derive(Debug)]
pub enum ApiError {
	BadRequest(String),
	NotFound(String),
	Lookup(FootprintError),
}

impl From<FootprintError> for ApiError {
	fn from(err: FootprintError) -> Self {
		ApiError::Lookup(err)
	}
}

impl From<QueryRejection> for ApiError {
	fn from(rejection: QueryRejection) -> Self {
		ApiError::BadRequest(rejection.body_text())
	}
}

impl ApiError {
	fn status(&self) -> StatusCode {
		match self {
			ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
			ApiError::NotFound(_) => StatusCode::NOT_FOUND,
			ApiError::Lookup(FootprintError::InvalidCoordinate { .. }) => StatusCode::BAD_REQUEST,
			ApiError::Lookup(FootprintError::Decode { .. } | FootprintError::UpstreamUnavailable { .. }) => {
				StatusCode::BAD_GATEWAY
			}
		}
	}

	fn kind(&self) -> &'static str {
		match self {
			ApiError::BadRequest(_) => "bad_request",
			ApiError::NotFound(_) => "not_found",
			ApiError::Lookup(err) => err.kind(),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = self.status();
		let message = match &self {
			ApiError::BadRequest(message) | ApiError::NotFound(message) => message.clone(),
			ApiError::Lookup(err) => err.to_string(),
		};

		if status.is_server_error() {
			log::warn!("send {status}: {message}");
		} else {
			log::debug!("send {status}: {message}");
		}

		let body = ErrorBody {
			error: self.kind(),
			message,
		};
		(status, Json(body)).into_response()
	}
}

type ApiResult<T> = Result<Json<T>, ApiError>;

pub async fn serve_config(State(state): State<ApiState>) -> Json<ClientConfig> {
	log::debug!("handle config request");
	Json(state.client_config.as_ref().clone())
}

pub async fn serve_geocode(
	State(state): State<ApiState>,
	query: Result<Query<GeocodeQuery>, QueryRejection>,
) -> ApiResult<Vec<GeocodeCandidate>> {
	let Query(query) = query?;
	log::debug!("handle geocode request: {:?}", query.q);

	let q = query.q.trim();
	if q.is_empty() {
		return Err(ApiError::BadRequest(String::from("query parameter 'q' must not be empty")));
	}
	Ok(Json(state.lookup.geocode(q).await?))
}

pub async fn serve_buildings(
	State(state): State<ApiState>,
	query: Result<Query<BuildingsQuery>, QueryRejection>,
) -> ApiResult<GeoCollection> {
	let Query(query) = query?;
	log::debug!("handle buildings request: {query:?}");

	let (_, buildings) = state.lookup.buildings_at(query.lat, query.lon, query.zoom).await?;
	Ok(Json(buildings))
}

pub async fn serve_lookup(
	State(state): State<ApiState>,
	query: Result<Query<LookupQuery>, QueryRejection>,
) -> ApiResult<LookupOutcome> {
	let Query(query) = query?;
	log::debug!("handle lookup request: {query:?}");

	let outcome = match (query.q.as_deref().map(str::trim), query.lat, query.lon) {
		(Some(q), None, None) if !q.is_empty() => state
			.lookup
			.lookup_query(q, query.zoom)
			.await?
			.ok_or_else(|| ApiError::NotFound(format!("no location found for '{q}'")))?,
		(None, Some(lat), Some(lon)) => state.lookup.lookup_point(Location::at(lat, lon), query.zoom).await?,
		_ => {
			return Err(ApiError::BadRequest(String::from(
				"expected either a non-empty 'q' or both 'lat' and 'lon'",
			)));
		}
	};

	Ok(Json(outcome))
}

/// Fallback when no static client directory is configured.
pub async fn serve_not_found(uri: Uri) -> Response<Body> {
	log::debug!("send 404 for {uri}");
	error_404()
}

// --- small helpers -----------------------------------------------------------

fn error_with(status: u16, message: &str) -> Response<Body> {
	Response::builder()
		.status(status)
		.header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
		.body(Body::from(message.as_bytes().to_vec()))
		.expect("failed to build error response")
}

pub fn error_404() -> Response<Body> {
	error_with(404, "Not Found")
}
