use std::path::Path;
use std::sync::Arc;

use sqlx::migrate::Migrator;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_core::config::Config;
use storefront_core::gateway::SnapClient;
use storefront_core::{create_app, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Setup logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database pool
    let pool = db::create_pool(&config).await?;

    // Run migrations
    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(&pool).await?;
    tracing::info!("Database migrations completed");

    // Payment gateway client
    let gateway = SnapClient::new(
        config.gateway_base_url.clone(),
        config.gateway_server_key.clone(),
    );

    let state = AppState {
        db: pool,
        gateway: Arc::new(gateway),
    };

    let app = create_app(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    tracing::info!("listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
