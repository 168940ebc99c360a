//! Error taxonomy of the lookup pipeline.
//!
//! Internals use `anyhow` with context chains. At component boundaries these are folded
//! into a [`FootprintError`] so callers can decide whether to retry, fall back or report.
//! An empty result (no building layer, no features) is not an error.

use crate::TileCoord;
use std::fmt::Display;
use thiserror::Error;

/// Result alias using [`FootprintError`].
pub type FootprintResult<T> = Result<T, FootprintError>;

#[derive(Debug, Error)]
pub enum FootprintError {
	/// Latitude, longitude or zoom cannot be mapped onto the tile grid.
	#[error("invalid coordinate ({input}): {reason}")]
	InvalidCoordinate { input: String, reason: String },

	/// The tile payload is malformed, truncated or uses an unknown geometry command.
	#[error("failed to decode tile {tile}: {reason}")]
	Decode { tile: TileCoord, reason: String },

	/// The remote tile/geocode service failed or answered with a non-2xx status.
	#[error("upstream request to '{url}' failed: {reason}")]
	UpstreamUnavailable {
		url: String,
		status: Option<u16>,
		reason: String,
	},
}

impl FootprintError {
	pub fn invalid_coordinate(input: impl Display, reason: impl Display) -> Self {
		FootprintError::InvalidCoordinate {
			input: input.to_string(),
			reason: reason.to_string(),
		}
	}

	/// Wraps a decoder error, keeping the whole cause chain in `reason`.
	pub fn decode(tile: TileCoord, err: &anyhow::Error) -> Self {
		FootprintError::Decode {
			tile,
			reason: format!("{err:#}"),
		}
	}

	pub fn upstream(url: impl Display, status: Option<u16>, reason: impl Display) -> Self {
		FootprintError::UpstreamUnavailable {
			url: url.to_string(),
			status,
			reason: reason.to_string(),
		}
	}

	/// Short machine readable name of the error kind.
	pub fn kind(&self) -> &'static str {
		match self {
			FootprintError::InvalidCoordinate { .. } => "invalid_coordinate",
			FootprintError::Decode { .. } => "decode_error",
			FootprintError::UpstreamUnavailable { .. } => "upstream_unavailable",
		}
	}

	/// Only upstream failures may succeed when the same request is issued again.
	pub fn is_retryable(&self) -> bool {
		matches!(self, FootprintError::UpstreamUnavailable { .. })
	}
}
