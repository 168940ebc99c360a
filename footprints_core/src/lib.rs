//! Core types for the building-footprint lookup: tile addresses, geographic points and
//! bounding boxes, camera fitting, binary payloads, protobuf readers/writers and the
//! error taxonomy shared by all crates of the workspace.

pub mod compression;

mod error;
pub use error::*;

pub mod io;

pub mod types;
pub use types::*;
