use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::handlers::not_found;
use crate::relay::Relay;
use crate::routes::create_routes;
use crate::slack::SlackVerifier;
use crate::upstream::HttpUpstream;

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
    pub legacy_status_codes: bool,
    /// Set when slash-command requests must carry a valid Slack signature.
    pub slack_verifier: Option<Arc<SlackVerifier>>,
}

/// Initialize tracing and logging for the application
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "groq_relay=info,tower_http=debug,axum::rejection=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Create the Axum application wired to the configured upstream
pub fn create_app(config: &Config) -> Result<Router, anyhow::Error> {
    info!("Initializing upstream client for {}", config.upstream_url);
    let transport = HttpUpstream::new(&config.upstream_url, &config.api_key, config.timeout)?;
    if config.slack_signing_secret.is_none() {
        warn!("SLACK_SIGNING_SECRET is not set, Slack requests will not be verified");
    }

    Ok(build_router(AppState {
        relay: Arc::new(Relay::new(Arc::new(transport))),
        legacy_status_codes: config.legacy_status_codes,
        slack_verifier: config
            .slack_signing_secret
            .as_ref()
            .map(|secret| Arc::new(SlackVerifier::new(secret.as_str()))),
    }))
}

/// Assemble routes and middleware around an already-built state
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(create_routes())
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
