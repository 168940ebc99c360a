//! Mapbox Vector Tile (MVT) protobuf reading and writing.
//!
//! - [`VectorTile`]: the top level message, a list of layers.
//! - [`VectorTileLayer`]: one named layer with its key/value tables and features.
//! - [`VectorTileFeature`]: tag indices plus the encoded geometry command stream.
//!
//! Writing is used to build tiles from local geometry, reading to decode upstream payloads.

mod feature;
mod geometry_type;
mod layer;
mod property_manager;
mod tile;
mod value;

pub use feature::VectorTileFeature;
pub use geometry_type::GeomType;
pub use layer::VectorTileLayer;
pub use property_manager::PropertyManager;
pub use tile::VectorTile;
