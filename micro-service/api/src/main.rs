use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

use app_config::AppConfig;
use app_error::AppError;
use micro_api::{AppState, create_routes, telemetry};

/// AI Doctor HTTP API
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "HOST")]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration, then let the command line win
    let mut config = AppConfig::load()?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    config.validate()?;

    let _guard = telemetry::init_tracing(&config);
    info!(
        "Starting {} in {} mode",
        app_models::service::SERVICE_NAME,
        config.environment
    );

    let address = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::from_config(config);
    let app = create_routes(state);

    // Bind server to address and start it
    let listener = TcpListener::bind(&address)
        .await
        .context(format!("Failed to bind to address: {}", address))?;

    info!("Listening on http://{}", address);

    // Peer address feeds the access log when no proxy header is present
    let service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
