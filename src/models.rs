use serde::{Deserialize, Serialize};

/// Request payload for the ask endpoint
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

impl AskRequest {
    /// Validates if the question is not empty or just whitespace
    pub fn is_valid(&self) -> bool {
        !self.question.trim().is_empty()
    }
}

/// Body sent to the upstream query API
#[derive(Debug, Serialize)]
pub struct UpstreamQuery {
    pub query: String,
}

/// Body returned by the upstream query API.
///
/// `error` is only checked for presence; a `null` value counts as absent.
#[derive(Debug, Deserialize)]
pub struct UpstreamResponse {
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub response: Option<String>,
}

/// Reply sent back to the caller: exactly one of `answer` or `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Reply {
    Answer(String),
    Error(String),
}

/// Slack slash-command form. Only `text` is used; other fields are ignored.
#[derive(Debug, Deserialize)]
pub struct SlackCommand {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlackResponseType {
    InChannel,
    Ephemeral,
}

/// Slash-command reply. Answers are posted to the channel, errors only to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlackReply {
    pub response_type: SlackResponseType,
    pub text: String,
}

impl SlackReply {
    pub fn answer(answer: &str) -> Self {
        Self {
            response_type: SlackResponseType::InChannel,
            text: format!("\u{1F916} *Collabor\u{b7}AI\u{b7}te says:*\n{answer}"),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            response_type: SlackResponseType::Ephemeral,
            text: format!("\u{26A0}\u{FE0F} Collabor\u{b7}AI\u{b7}te ran into an error: `{message}`"),
        }
    }
}

/// Response payload for the health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: "Service is healthy".to_string(),
        }
    }
}
