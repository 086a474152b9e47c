//! Wayfind API crate - axum HTTP server and route handlers.
//!
//! Exposes the guide conversation endpoint, reverse geocoding for the
//! location chip, the category vocabulary and a health check.

pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
