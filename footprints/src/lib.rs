//! # Footprints
//!
//! Looks up building footprints around a place: the position is mapped onto the Web
//! Mercator tile grid, the vector tile is fetched from a Mapbox compatible API, its
//! `building` layer is decoded into GeoJSON and a camera is fitted to the result.
//!
//! ## Usage Example
//!
//! ```rust
//! use footprints::lookup::{bounding_box_of, map_to_tile};
//! use footprints::geometry::geo::GeoCollection;
//!
//! let tile = map_to_tile(37.7749, -122.4194, 19).unwrap();
//! assert_eq!(tile.to_string(), "19/83857/202648");
//! assert!(bounding_box_of(&GeoCollection::new()).is_none());
//! ```

pub mod config;
pub mod lookup;
pub mod server;
pub mod upstream;
pub mod viewer;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::Config;
pub use footprints_core as core;
pub use footprints_geometry as geometry;
