mod cors;
mod footprint_server;
mod handlers;
mod routes;

pub use cors::build_cors_layer;
pub use footprint_server::FootprintServer;
pub use handlers::{ApiError, ApiState};
