use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{UpstreamQuery, UpstreamResponse};
use crate::upstream::{TransportError, UpstreamTransport};

pub const FALLBACK_ANSWER: &str = "Sorry, I didn't get that.";

#[derive(Debug, Error)]
pub enum RelayError {
    /// The upstream answered with an `error` field. Its detail is not kept.
    #[error("upstream reported an error")]
    Upstream,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Forwards questions to the upstream and interprets its replies.
#[derive(Clone)]
pub struct Relay {
    transport: Arc<dyn UpstreamTransport>,
}

impl Relay {
    pub fn new(transport: Arc<dyn UpstreamTransport>) -> Self {
        Self { transport }
    }

    /// Makes exactly one upstream call for `question` and returns the answer.
    pub async fn ask(&self, question: &str) -> Result<String, RelayError> {
        let query = UpstreamQuery {
            query: question.to_string(),
        };

        let reply = self.transport.post_query(&query).await?;

        if !reply.status.is_success() {
            warn!("Upstream responded with status {}", reply.status);
        }

        let malformed = |source: serde_json::Error| TransportError::MalformedResponse {
            status: reply.status,
            source,
        };
        // Only a JSON object is a valid upstream reply.
        let body: serde_json::Value = serde_json::from_slice(&reply.body).map_err(malformed)?;
        if !body.is_object() {
            return Err(TransportError::NotAnObject {
                status: reply.status,
            }
            .into());
        }
        let parsed: UpstreamResponse = serde_json::from_value(body).map_err(malformed)?;

        if let Some(detail) = parsed.error {
            warn!("Upstream returned an error payload: {}", detail);
            return Err(RelayError::Upstream);
        }

        match parsed.response {
            Some(answer) => Ok(answer),
            None => {
                debug!("Upstream reply had no response field, using fallback answer");
                Ok(FALLBACK_ANSWER.to_string())
            }
        }
    }
}
