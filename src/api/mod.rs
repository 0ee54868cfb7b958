//! HTTP API module: the status page routes plus a health check.

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
