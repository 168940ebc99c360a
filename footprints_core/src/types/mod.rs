mod blob;
mod camera;
mod geo_bbox;
mod geo_point;
mod tile_coord;

pub use blob::*;
pub use camera::*;
pub use geo_bbox::*;
pub use geo_point::*;
pub use tile_coord::*;
