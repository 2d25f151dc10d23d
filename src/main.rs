use std::sync::Arc;

use actix_web::web;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;
mod domain;
mod event_sourcing;
mod health;
mod metrics;
mod models;
mod store;
mod utils;

use api::AppState;
use config::{AppConfig, StoreBackend};
use domain::catalog::CatalogService;
use domain::discount::DiscountService;
use domain::identity::{IdentityService, SessionRegistry};
use domain::ledger::LedgerService;
use domain::order::OrderCommandHandler;
use store::{MemoryStore, ScyllaStore, Store};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    // RUST_LOG wins over the configured filter
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.filter)))
        .init();

    tracing::info!("🚀 Starting kitchen ordering service");
    if let Some(path) = &config.env_file {
        tracing::info!(path = %path.display(), "Loaded environment variables from env file");
    }

    // === 1. Store ===
    let store: Arc<dyn Store> = match config.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Scylla => Arc::new(ScyllaStore::connect(&config.store.scylla).await?),
    };

    // === 2. Metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 3. Services ===
    let sessions = SessionRegistry::new(chrono::Duration::minutes(config.sessions.ttl_minutes));
    let state = web::Data::new(AppState {
        store: store.clone(),
        orders: OrderCommandHandler::new(store.clone(), metrics.clone(), config.orders.transition_policy),
        discounts: DiscountService::new(store.clone(), metrics.clone()),
        catalog: CatalogService::new(store.clone(), config.menu.bulk_insert_mode),
        identity: IdentityService::new(store.clone(), sessions),
        ledger: LedgerService::new(store),
    });

    tracing::info!(
        policy = ?config.orders.transition_policy,
        bulk_insert = ?config.menu.bulk_insert_mode,
        "✅ Services ready"
    );

    // === 4. Servers ===
    let api_server = api::start_api_server(state, config.server.host.clone(), config.server.port);

    if config.metrics.enabled {
        let registry = Arc::new(metrics.registry().clone());
        let metrics_server = metrics::start_metrics_server(registry, config.server.host.clone(), config.metrics.port);
        futures_util::future::try_join(api_server, metrics_server).await?;
    } else {
        api_server.await?;
    }

    tracing::info!("👋 Shutdown complete");
    Ok(())
}
