//! Configuration of the footprints service.
//!
//! - [`Config`](crate::config::Config): top-level loader and YAML parser
//! - [`ServerConfig`](crate::config::ServerConfig): address and static client directory
//! - [`CorsConfig`](crate::config::CorsConfig): CORS policy
//! - [`UpstreamConfig`](crate::config::UpstreamConfig): remote tile and geocoding service
//! - [`ViewerConfig`](crate::config::ViewerConfig): map style and viewport handed to the client
//!
//! Values are layered: defaults, then the YAML file, then the environment, then
//! command line flags.

mod cors;
mod main;
mod server;
mod upstream;
mod viewer;

pub use cors::CorsConfig;
pub use main::{ACCESS_TOKEN_ENV, Config};
pub use server::ServerConfig;
pub use upstream::UpstreamConfig;
pub use viewer::ViewerConfig;
