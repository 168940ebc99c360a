//! CORS layer built from configured origin patterns.
//!
//! Supported `allowed_origins` patterns:
//! - `"*"`                     → allow all origins
//! - `"*.example.com"`        → suffix match
//! - `"https://example.com*"` → prefix match
//! - `"/^https://(foo|bar)\.example\.com$/"` → custom regex (leading and trailing `/`)
//! - exact strings like `"https://maps.example.org"`

use crate::config::CorsConfig;
use anyhow::{Context, Result};
use axum::http::{header::HeaderValue, request::Parts};
use regex::Regex;
use tower_http::cors::{AllowOrigin, CorsLayer};

type Predicate = Box<dyn Fn(&str) -> bool + Send + Sync + 'static>;

fn compile_pattern(pattern: &str) -> Result<Predicate> {
	Ok(if pattern == "*" {
		Box::new(|_: &str| true)
	} else if let Some(regex) = pattern.strip_prefix('/').and_then(|p| p.strip_suffix('/')) {
		let re = Regex::new(regex).with_context(|| format!("invalid CORS origin regex '{pattern}'"))?;
		Box::new(move |origin: &str| re.is_match(origin))
	} else if let Some(suffix) = pattern.strip_prefix('*').filter(|s| !s.is_empty() && !s.contains('*')) {
		let suffix = suffix.to_string();
		Box::new(move |origin: &str| origin.ends_with(&suffix))
	} else if let Some(prefix) = pattern.strip_suffix('*').filter(|p| !p.is_empty() && !p.contains('*')) {
		let prefix = prefix.to_string();
		Box::new(move |origin: &str| origin.starts_with(&prefix))
	} else {
		let exact = pattern.to_string();
		Box::new(move |origin: &str| origin == exact)
	})
}

/// Builds a `CorsLayer` whose origin predicate ORs all configured patterns.
pub fn build_cors_layer(config: &CorsConfig) -> Result<CorsLayer> {
	let checks = config
		.allowed_origins
		.iter()
		.map(|pattern| compile_pattern(pattern))
		.collect::<Result<Vec<Predicate>>>()?;

	let mut layer = CorsLayer::new().allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _req: &Parts| {
		let origin_str = origin.to_str().unwrap_or("");
		checks.iter().any(|f| f(origin_str))
	}));

	if let Some(max_age) = config.max_age() {
		layer = layer.max_age(max_age);
	}

	Ok(layer)
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::{
		Router,
		body::Body,
		http::{
			Method, Request,
			header::{ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN},
		},
		routing::get,
	};
	use tower::ServiceExt; // for `oneshot`

	fn layer(origins: &[&str]) -> CorsLayer {
		build_cors_layer(&CorsConfig {
			allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
			max_age_seconds: None,
		})
		.unwrap()
	}

	async fn has_acao(layer: CorsLayer, origin: &str) -> bool {
		let app = Router::new().route("/", get(|| async { "ok" })).layer(layer);

		let req = Request::builder()
			.uri("/")
			.header(ORIGIN, origin)
			.body(Body::empty())
			.unwrap();

		let resp = app.oneshot(req).await.unwrap();
		resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_some()
	}

	#[tokio::test]
	async fn exact_match() {
		let layer = layer(&["https://maps.example.org"]);
		assert!(has_acao(layer.clone(), "https://maps.example.org").await);
		assert!(!has_acao(layer.clone(), "https://maps.example.com").await);
	}

	#[tokio::test]
	async fn star_all() {
		let layer = layer(&["*"]);
		assert!(has_acao(layer.clone(), "http://anything.local").await);
		assert!(has_acao(layer.clone(), "https://whatever.example").await);
	}

	#[tokio::test]
	async fn suffix_match() {
		let layer = layer(&["*example.com"]);
		assert!(has_acao(layer.clone(), "https://foo.example.com").await);
		assert!(!has_acao(layer.clone(), "https://example.org").await);
	}

	#[tokio::test]
	async fn prefix_match() {
		let layer = layer(&["https://dev-*"]);
		assert!(has_acao(layer.clone(), "https://dev-01.example.com").await);
		assert!(!has_acao(layer.clone(), "https://prod-01.example.com").await);
	}

	#[tokio::test]
	async fn regex_match() {
		let layer = layer(&["/^https://(foo|bar)\\.example\\.com$/"]);
		assert!(has_acao(layer.clone(), "https://foo.example.com").await);
		assert!(has_acao(layer.clone(), "https://bar.example.com").await);
		assert!(!has_acao(layer.clone(), "https://baz.example.com").await);
	}

	#[tokio::test]
	async fn nothing_allowed() {
		assert!(!has_acao(layer(&[]), "https://maps.example.org").await);
	}

	#[test]
	fn invalid_regex() {
		let err = build_cors_layer(&CorsConfig {
			allowed_origins: vec!["/([a-z/".to_string()],
			max_age_seconds: None,
		})
		.unwrap_err();
		assert!(err.to_string().starts_with("invalid CORS origin regex"));
	}

	#[tokio::test]
	async fn preflight_max_age() {
		let layer = build_cors_layer(&CorsConfig {
			allowed_origins: vec!["*".to_string()],
			max_age_seconds: Some(600),
		})
		.unwrap();
		let app = Router::new().route("/", get(|| async { "ok" })).layer(layer);

		let req = Request::builder()
			.method(Method::OPTIONS)
			.uri("/")
			.header(ORIGIN, "https://maps.example.org")
			.header(ACCESS_CONTROL_REQUEST_METHOD, "GET")
			.body(Body::empty())
			.unwrap();

		let resp = app.oneshot(req).await.unwrap();
		assert_eq!(resp.headers().get(ACCESS_CONTROL_MAX_AGE).unwrap(), "600");
	}
}
