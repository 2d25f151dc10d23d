use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::{ApiError, AppState};
use crate::domain::order::{LineRequest, OrderStatus};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/orders", web::post().to(create_order))
        .route("/kitchens/{id}/orders", web::get().to(list_by_kitchen))
        .route("/kitchens/{id}/pipeline", web::get().to(pipeline))
        .route("/orders/{id}", web::get().to(get_order))
        .route("/orders/{id}/status", web::put().to(update_status))
        .route("/orders/{id}/advance", web::post().to(advance))
        .route("/orders/{id}/events", web::get().to(history));
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderBody {
    kitchen_id: Uuid,
    items: Vec<LineRequest>,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: OrderStatus,
}

async fn create_order(state: web::Data<AppState>, body: web::Json<CreateOrderBody>) -> Result<HttpResponse, ApiError> {
    let order_id = state.orders.create_order(body.kitchen_id, &body.items).await?;
    Ok(HttpResponse::Created().json(json!({ "orderId": order_id })))
}

async fn list_by_kitchen(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.orders.list_by_kitchen(path.into_inner()).await?))
}

async fn pipeline(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.orders.pipeline(path.into_inner()).await?))
}

async fn get_order(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.orders.get(path.into_inner()).await?))
}

async fn update_status(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<StatusBody>,
) -> Result<HttpResponse, ApiError> {
    let order = state.orders.update_status(path.into_inner(), body.status).await?;
    Ok(HttpResponse::Ok().json(order))
}

async fn advance(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.orders.advance(path.into_inner()).await?))
}

async fn history(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.orders.history(path.into_inner()).await?))
}
