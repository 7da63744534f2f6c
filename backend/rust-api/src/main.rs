use std::sync::Arc;

use jagruk_api::services::seed;
use jagruk_api::{create_router, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jagruk_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!(database = %config.mongo_database, "Configuration loaded");

    let mongo_client = mongodb::Client::with_uri_str(&config.mongo_uri).await?;
    let state = Arc::new(AppState::new(config, mongo_client).await?);

    seed::bootstrap(&state.config, &state.mongo).await?;

    let app = create_router(state);

    let addr = "0.0.0.0:8080";
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("JAGRUK API listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
