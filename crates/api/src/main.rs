use std::env;

use anyhow::Result;
use hotel_api::build_app;
use hotel_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("hotel_api");

    let bind = env::var("HOTEL_BIND").unwrap_or_else(|_| "0.0.0.0:5000".to_string());

    let app = build_app().await?;

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(bind = %bind, "hotel booking api started");

    axum::serve(listener, app).await?;
    Ok(())
}
