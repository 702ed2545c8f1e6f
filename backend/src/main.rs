//! Main entry point for the accounts backend.
//!
//! This file initializes the Axum web server, sets up the database
//! connection, and registers all API routes and middleware.

use backend::config::Config;
use backend::database::Database;
use tracing::info;
use tracing_subscriber::fmt::init;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();

    let config = Config::from_env()?;
    let db = Database::new(&config).await?;
    let pool = db.pool().clone();

    let app = backend::app(pool, config.clone()).await;

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("Starting accounts backend on port {}", config.server_port);
    axum::serve(listener, app).await?;

    Ok(())
}
