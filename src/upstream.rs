use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::models::UpstreamQuery;

/// Raw HTTP reply from the upstream, before its body is interpreted.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Bytes,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),

    #[error("upstream request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("upstream returned a JSON body that is not an object (status {status})")]
    NotAnObject { status: StatusCode },

    #[error("upstream returned a malformed body (status {status}): {source}")]
    MalformedResponse {
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },
}

/// Sends one query to the upstream API.
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    async fn post_query(&self, query: &UpstreamQuery) -> Result<UpstreamReply, TransportError>;
}

/// reqwest-backed transport that POSTs JSON with a bearer credential.
pub struct HttpUpstream {
    client: reqwest::Client,
    url: String,
    api_key: String,
    timeout: Duration,
}

impl HttpUpstream {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
            timeout,
        })
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::Request(err)
        }
    }
}

#[async_trait]
impl UpstreamTransport for HttpUpstream {
    async fn post_query(&self, query: &UpstreamQuery) -> Result<UpstreamReply, TransportError> {
        debug!("Posting query to upstream {}", self.url);

        // `.json` sets Content-Type: application/json
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(query)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        debug!("Upstream replied with status {} ({} bytes)", status, body.len());

        Ok(UpstreamReply { status, body })
    }
}
