use crate::app::AppState;
use crate::handlers::{ask_handler, health_check, method_not_allowed, slack_command_handler};
use axum::{Router, routing::get, routing::post};

/// Creates and configures all application routes
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/ask", post(ask_handler).fallback(method_not_allowed))
        .route(
            "/askai",
            post(slack_command_handler).fallback(method_not_allowed),
        )
}
