use crate::app::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{AskRequest, HealthResponse, Reply, SlackCommand, SlackReply};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json as ResponseJson, Response},
};
use tracing::{debug, error, info, warn};

/// Health check handler
/// Returns the service status and health information
pub async fn health_check() -> AppResult<ResponseJson<HealthResponse>> {
    debug!("Health check endpoint called");

    Ok(ResponseJson(HealthResponse::ok()))
}

/// Ask handler: relays the question upstream and returns the answer.
///
/// The raw body is parsed as JSON regardless of its content type, so form
/// frontends that post without a JSON header still work.
pub async fn ask_handler(State(state): State<AppState>, body: Bytes) -> Response {
    match ask(&state, &body).await {
        Ok(answer) => (StatusCode::OK, ResponseJson(Reply::Answer(answer))).into_response(),
        Err(err) if state.legacy_status_codes && err.is_relay_failure() => {
            warn!("Relay failure sent with legacy 200 status: {:?}", err);
            (StatusCode::OK, ResponseJson(Reply::Error(err.public_message()))).into_response()
        }
        Err(err) => err.into_response(),
    }
}

async fn ask(state: &AppState, body: &[u8]) -> AppResult<String> {
    let payload: AskRequest = serde_json::from_slice(body).map_err(|e| {
        warn!("Rejected ask request: {}", e);
        AppError::from(e)
    })?;

    if !payload.is_valid() {
        return Err(AppError::ValidationError(
            "Question cannot be empty or only whitespace".to_string(),
        ));
    }

    info!(
        "Ask endpoint called with a {} character question",
        payload.question.chars().count()
    );
    debug!("Question: {}", payload.question);

    let answer = state.relay.ask(&payload.question).await?;

    info!("Successfully relayed question, returning answer");
    Ok(answer)
}

/// Slack slash-command handler (`/askai`).
///
/// Answers and relay failures are both sent with 200 so Slack shows them;
/// only a failed signature check is rejected outright.
pub async fn slack_command_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(verifier) = &state.slack_verifier {
        if let Err(e) = verifier.verify(&headers, &body, chrono::Utc::now().timestamp()) {
            warn!("Rejected Slack request: {}", e);
            return AppError::Forbidden.into_response();
        }
    }

    let command: SlackCommand = match serde_urlencoded::from_bytes(&body) {
        Ok(command) => command,
        Err(e) => {
            warn!("Rejected Slack request with unreadable form: {}", e);
            return AppError::BadRequest(format!("Invalid form body: {e}")).into_response();
        }
    };

    let question = command.text.unwrap_or_default();
    if question.trim().is_empty() {
        return ResponseJson(SlackReply::error(
            "please add a question after the command",
        ))
        .into_response();
    }

    info!(
        "Slack command received with a {} character question",
        question.chars().count()
    );

    let reply = match state.relay.ask(&question).await {
        Ok(answer) => SlackReply::answer(&answer),
        Err(e) => {
            let err = AppError::from(e);
            error!("Slack command failed: {:?}", err);
            SlackReply::error(&err.public_message())
        }
    };
    ResponseJson(reply).into_response()
}

/// Rejects any method other than POST on the relay routes.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

pub async fn not_found() -> AppError {
    AppError::NotFound
}
