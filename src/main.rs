use groq_relay::app::{create_app, init_tracing};
use groq_relay::config::Config;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // A missing .env file is fine; the environment may already be populated
    let dotenv = dotenvy::dotenv();

    // Initialize tracing/logging
    init_tracing();

    info!("Starting Groq relay service...");
    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!("Failed to load .env file: {}", e);
        }
    }

    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };
    info!("Configuration loaded: {:?}", config);

    // Create the application
    let app = match create_app(&config) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to create app: {}", e);
            std::process::exit(1);
        }
    };

    // Create TCP listener
    let listener = match tokio::net::TcpListener::bind(&config.bind_address()).await {
        Ok(listener) => {
            info!("Server running on {}", config.server_url());
            info!("Health check: GET /health");
            info!("Ask endpoint: POST /api/ask");
            info!("Slack command endpoint: POST /askai");
            listener
        }
        Err(e) => {
            error!("Failed to bind to {}: {}", config.bind_address(), e);
            std::process::exit(1);
        }
    };

    // Start the server
    info!("Server starting...");
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
    } else {
        info!("Server shutdown gracefully");
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
