use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::models::Reply;
use crate::relay::RelayError;
use crate::upstream::TransportError;

/// Generic reply for an upstream error payload. The upstream detail is never surfaced.
pub const UPSTREAM_ERROR_MESSAGE: &str = "Sorry, something went wrong!";

/// Custom error type for the application
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    ValidationError(String),
    Forbidden,
    MethodNotAllowed,
    NotFound,
    Upstream,
    UpstreamUnavailable(String),
    UpstreamTimeout,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Upstream | AppError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Message shown to the caller.
    pub fn public_message(&self) -> String {
        match self {
            AppError::BadRequest(msg) | AppError::ValidationError(msg) => msg.clone(),
            AppError::Forbidden => "Unauthorized".to_string(),
            AppError::MethodNotAllowed => "Method not allowed".to_string(),
            AppError::NotFound => "Not found".to_string(),
            AppError::Upstream => UPSTREAM_ERROR_MESSAGE.to_string(),
            AppError::UpstreamUnavailable(_) => "Upstream service unavailable".to_string(),
            AppError::UpstreamTimeout => "Upstream request timed out".to_string(),
        }
    }

    /// Whether the error came from the relay step rather than the caller.
    pub fn is_relay_failure(&self) -> bool {
        matches!(
            self,
            AppError::Upstream | AppError::UpstreamUnavailable(_) | AppError::UpstreamTimeout
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::UpstreamUnavailable(detail) => error!("Upstream unavailable: {}", detail),
            AppError::UpstreamTimeout => error!("Upstream request timed out"),
            _ => {}
        }

        let status = self.status();
        let body = Json(Reply::Error(self.public_message()));

        if matches!(self, AppError::MethodNotAllowed) {
            return (status, [(header::ALLOW, "POST")], body).into_response();
        }
        (status, body).into_response()
    }
}

impl From<RelayError> for AppError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::Upstream => AppError::Upstream,
            RelayError::Transport(TransportError::Timeout(_)) => AppError::UpstreamTimeout,
            RelayError::Transport(other) => AppError::UpstreamUnavailable(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            serde_json::error::Category::Data => AppError::ValidationError(err.to_string()),
            _ => AppError::BadRequest(format!("Invalid JSON body: {err}")),
        }
    }
}

/// Result type for application handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn relay_errors_map_to_gateway_statuses() {
        let upstream = AppError::from(RelayError::Upstream);
        let timeout = AppError::from(RelayError::Transport(TransportError::Timeout(
            Duration::from_secs(1),
        )));

        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(upstream.public_message(), UPSTREAM_ERROR_MESSAGE);
        assert_eq!(timeout.status(), StatusCode::GATEWAY_TIMEOUT);
        assert!(timeout.is_relay_failure());
    }

    #[test]
    fn json_errors_are_split_by_category() {
        let syntax = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let data = serde_json::from_str::<crate::models::AskRequest>("{}").unwrap_err();

        assert_eq!(AppError::from(syntax).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::from(data).status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn method_not_allowed_advertises_post() {
        let response = AppError::MethodNotAllowed.into_response();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "POST");
    }
}
