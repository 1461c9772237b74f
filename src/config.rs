use std::env;
use std::fmt;
use std::time::Duration;

use anyhow::{Context, bail};

pub const DEFAULT_UPSTREAM_URL: &str = "https://api.groq.com/v1/query";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub upstream_url: String,
    pub api_key: String,
    pub timeout: Duration,
    /// Send relay failures with HTTP 200, the way the PHP endpoint did.
    pub legacy_status_codes: bool,
    /// Enables Slack signature checks on the slash-command route.
    pub slack_signing_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got {raw:?}"))?,
            None => 8080,
        };

        let api_key = lookup("GROQ_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .context("GROQ_API_KEY must be set")?;

        let timeout_ms: u64 = match lookup("UPSTREAM_TIMEOUT_MS") {
            Some(raw) => raw.trim().parse().with_context(|| {
                format!("UPSTREAM_TIMEOUT_MS must be a number of milliseconds, got {raw:?}")
            })?,
            None => DEFAULT_TIMEOUT_MS,
        };
        if timeout_ms == 0 {
            bail!("UPSTREAM_TIMEOUT_MS must be greater than zero");
        }

        let legacy_status_codes = match lookup("LEGACY_STATUS_CODES") {
            Some(raw) => parse_flag(&raw)
                .with_context(|| format!("LEGACY_STATUS_CODES must be a boolean, got {raw:?}"))?,
            None => false,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            upstream_url: lookup("GROQ_API_URL").unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string()),
            api_key,
            timeout: Duration::from_millis(timeout_ms),
            legacy_status_codes,
            slack_signing_secret: lookup("SLACK_SIGNING_SECRET")
                .map(|secret| secret.trim().to_string())
                .filter(|secret| !secret.is_empty()),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("upstream_url", &self.upstream_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("legacy_status_codes", &self.legacy_status_codes)
            .field(
                "slack_signing_secret",
                &self.slack_signing_secret.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
