use clap::Parser;
use dotenvy::dotenv;
use std::env;

use flow_tracker_back_end::api::{build_router, config::ApiConfig};
use flow_tracker_back_end::utils::app_config::{AppConfig, AppSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv();
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG")
                .unwrap_or_else(|_| "info".to_string())
                .as_str(),
        )
        .init();

    // Listen address, upstream endpoints and retry policy
    let settings = AppSettings::parse();
    let api_config = ApiConfig::from_settings(&settings);

    tracing::info!("API configuration loaded successfully");

    let app_config = AppConfig::new(settings)?;
    tracing::info!(
        price = app_config.settings.price_url.is_some(),
        exchange_feed = app_config.settings.exchange_feed_url.is_some(),
        bridge_feed = app_config.settings.bridge_feed_url.is_some(),
        swap_feed = app_config.settings.swap_feed_url.is_some(),
        "Application configuration loaded successfully"
    );

    let router = build_router(app_config);

    let addr = api_config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Starting flow tracker API server on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
