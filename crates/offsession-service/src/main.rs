//! Off-session charge service - HTTP entry point.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use offsession_service::{create_router, AppState, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine; the environment may already be set.
    let dotenv_path = dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,offsession_service=debug,offsession_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(dotenv = ?dotenv_path, "Starting off-session charge service");

    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        stripe_configured = %config.stripe_secret_key.is_some(),
        webhook_secret_configured = %config.stripe_webhook_secret.is_some(),
        stripe_api_version = ?config.stripe_api_version,
        static_dir = ?config.static_dir,
        "Service configuration loaded"
    );

    let state = AppState::new(config.clone());
    let app = create_router(state);

    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
