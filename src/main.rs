use sqlx::migrate::Migrator;
use std::net::SocketAddr;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use card_transaction_service::clients::{FraudClient, NotificationClient};
use card_transaction_service::config::Config;
use card_transaction_service::db::{self, TransactionStore};
use card_transaction_service::services::TransactionWorkflow;
use card_transaction_service::{AppState, create_app};

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

    config.validate()?;

    // Database pool
    let pool = db::create_pool(&config).await?;

    // Run migrations
    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(&pool).await?;
    tracing::info!("database migrations completed");

    let store = TransactionStore::new(pool.clone(), config.max_page_size);
    let fraud = FraudClient::new(
        config.fraud_api_url.clone(),
        config.collaborator_timeout_secs,
    );
    let notifier = NotificationClient::new(
        config.notify_api_url.clone(),
        config.collaborator_timeout_secs,
    );
    tracing::info!(
        fraud_api_url = %config.fraud_api_url,
        notify_api_url = %config.notify_api_url,
        environment = %config.environment,
        "collaborator clients initialized"
    );

    let workflow = TransactionWorkflow::new(store, fraud, notifier);
    let app = create_app(AppState { workflow });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("transaction service listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("database connection closed");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
