//! HTTP server for the service manual retrieval engine.

pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
