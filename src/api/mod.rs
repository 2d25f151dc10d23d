// ============================================================================
// HTTP API
// ============================================================================
//
// JSON over actix-web. Handlers are thin: decode, call one service, encode.
// Route modules:
// - kitchens      : kitchens and menu items
// - orders        : placement, status changes, history, pipeline
// - discounts     : creation, listing, code validation
// - users         : admin invites and customer sessions
// - transactions  : payment ledger
//
// ============================================================================

mod discounts;
mod error;
mod kitchens;
mod orders;
mod transactions;
mod users;

pub use error::ApiError;

use std::sync::Arc;

use actix_web::{web, App, HttpResponse, HttpServer};

use crate::domain::catalog::CatalogService;
use crate::domain::discount::DiscountService;
use crate::domain::identity::IdentityService;
use crate::domain::ledger::LedgerService;
use crate::domain::order::OrderCommandHandler;
use crate::health::{check_store, HealthReport};
use crate::store::Store;

/// Shared state handed to every handler
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub orders: OrderCommandHandler,
    pub discounts: DiscountService,
    pub catalog: CatalogService,
    pub identity: IdentityService,
    pub ledger: LedgerService,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .configure(kitchens::configure)
        .configure(orders::configure)
        .configure(discounts::configure)
        .configure(users::configure)
        .configure(transactions::configure);
}

pub async fn start_api_server(state: web::Data<AppState>, host: String, port: u16) -> std::io::Result<()> {
    tracing::info!("🚀 Starting API server on http://{}:{}", host, port);

    HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .bind((host.as_str(), port))?
        .run()
        .await
}

async fn health(state: web::Data<AppState>) -> HttpResponse {
    let report = HealthReport::from_components(vec![check_store(state.store.as_ref()).await]);
    if report.healthy {
        HttpResponse::Ok().json(report)
    } else {
        HttpResponse::ServiceUnavailable().json(report)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::domain::catalog::BulkInsertMode;
    use crate::domain::identity::SessionRegistry;
    use crate::domain::order::TransitionPolicy;
    use crate::metrics::Metrics;
    use crate::store::MemoryStore;

    pub fn state() -> web::Data<AppState> {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let metrics = Arc::new(Metrics::new().unwrap());

        web::Data::new(AppState {
            orders: OrderCommandHandler::new(store.clone(), metrics.clone(), TransitionPolicy::Permissive),
            discounts: DiscountService::new(store.clone(), metrics),
            catalog: CatalogService::new(store.clone(), BulkInsertMode::BestEffort),
            identity: IdentityService::new(store.clone(), SessionRegistry::new(chrono::Duration::minutes(30))),
            ledger: LedgerService::new(store.clone()),
            store,
        })
    }
}
