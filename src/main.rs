use actix_web::{web, App, HttpServer};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;
mod domain;
mod event_sourcing;
mod metrics;

use config::{Config, StoreBackend};
use domain::order::{OrderEvent, OrderService};
use event_sourcing::{EventStore, InMemoryEventStore, PostgresEventStore};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,coffee_orders=debug"))
        )
        .init();

    let config = Config::load()?;
    tracing::info!(store = ?config.store, "Starting coffee order service");

    let event_store = build_event_store(&config).await?;

    let metrics = Arc::new(metrics::Metrics::new()?);
    let service = web::Data::new(OrderService::new(event_store, metrics.clone()));
    let credentials = web::Data::new(config.credentials.clone());
    let metrics = web::Data::new(metrics);

    tracing::info!("Listening on http://{}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(credentials.clone())
            .app_data(metrics.clone())
            .configure(api::configure)
    })
    .bind((config.bind_addr.as_str(), config.port))
    .with_context(|| format!("failed to bind {}:{}", config.bind_addr, config.port))?
    .run()
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn build_event_store(config: &Config) -> anyhow::Result<Arc<dyn EventStore<OrderEvent>>> {
    match config.store {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory event store; orders are lost on restart");
            Ok(Arc::new(InMemoryEventStore::<OrderEvent>::new()))
        }
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL not set")?;

            tracing::info!("Connecting to Postgres...");
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect(url)
                .await
                .context("failed to connect to Postgres")?;

            let store = PostgresEventStore::<OrderEvent>::new(pool, "Order");
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
    }
}
