//! Schematic upload server
//!
//! Accepts structure files over HTTP and serves the generated glTF models.

use schematic_converter::server::{create_router, AppState, ServerConfig};
use schematic_converter::{Converter, ConverterConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    let converter = Converter::from_config(ConverterConfig::from_env())?;
    tokio::fs::create_dir_all(&config.output_dir).await?;

    let bind_addr = config.bind_address.clone();
    let output_dir = config.output_dir.clone();
    let app = create_router(AppState::new(converter, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(
        "Schematic server running on http://{} (serving {})",
        bind_addr,
        output_dir.display()
    );

    axum::serve(listener, app).await?;

    Ok(())
}
