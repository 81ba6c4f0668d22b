/**
 * duochat Server Entry Point
 *
 * Loads configuration, opens the database and serves the REST API and the
 * `/ws` live channel.
 */

use duochat::backend::server::{config::load_config, create_app, StartupError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("[Startup] Server initialization started");

    let config = load_config().inspect_err(|e| {
        tracing::error!("[Startup] {}", e);
    })?;
    let address = config.bind_address();

    let app = create_app(config).await.inspect_err(|e| {
        tracing::error!("[Startup] {}", e);
    })?;

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;
    tracing::info!("[Startup] Listening on {}", address);

    axum::serve(listener, app.router).await?;

    Ok(())
}
