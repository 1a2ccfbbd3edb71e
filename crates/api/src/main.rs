use anyhow::{Context, Result};
use std::net::SocketAddr;
use tracing::info;

use school_portal_api::{app, config, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::Config::load()?;

    middleware::logging::init_logging(&config.logging)?;
    middleware::init_metrics()?;

    info!("Starting School Portal API v{}", env!("CARGO_PKG_VERSION"));
    info!(
        supabase = %config.supabase.rest_url(),
        enrollment_bucket = %config.storage.enrollment_bucket,
        "Upstream configured"
    );

    let addr = config
        .socket_addr()
        .context("invalid server.host/server.port")?;

    let app = app::create_app(config)?;

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
