//! Storefront Account Service

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_account::api::{self, AppState};
use storefront_account::config::AccountConfig;
use storefront_account::infrastructure::{memory::LogPublisher, nats::NatsPublisher, postgres::PgAccountStore, Collaborators};
use storefront_account::ports::EventPublisher;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = AccountConfig::from_env()?;

    let events: Arc<dyn EventPublisher> = match &config.nats_url {
        Some(url) => match NatsPublisher::connect(url).await {
            Ok(publisher) => Arc::new(publisher),
            Err(e) => {
                tracing::warn!(error = %e, "NATS unavailable, account events go to the log");
                Arc::new(LogPublisher)
            }
        },
        None => Arc::new(LogPublisher),
    };

    let collaborators = match &config.database_url {
        Some(url) => Collaborators::postgres(PgAccountStore::connect(url, config.db_max_connections).await?, events),
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory stores");
            Collaborators::in_memory(events)
        }
    };

    let app = api::router(AppState::new(collaborators));
    tracing::info!("Storefront account listening on {}", config.bind_address());
    axum::serve(tokio::net::TcpListener::bind(config.bind_address()).await?, app).await?;
    Ok(())
}
