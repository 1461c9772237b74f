pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod relay;
pub mod routes;
pub mod slack;
pub mod upstream;

// Re-export key functions for convenience
pub use app::{AppState, build_router, create_app, init_tracing};
