//! Geometry model and Mapbox Vector Tile decoding.
//!
//! [`decode_tile`] turns the raw payload of one tile into a [`geo::GeoCollection`] of the
//! features of one layer, with coordinates projected to WGS84.

mod decode;
pub mod geo;
pub mod vector_tile;

pub use decode::decode_tile;
