use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiError, AppState};
use crate::domain::catalog::{BulkInsertMode, NewKitchen, NewMenuItem};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/kitchens")
            .route(web::post().to(create_kitchen))
            .route(web::get().to(list_kitchens)),
    )
    .service(
        web::resource("/kitchens/{id}/menu-items")
            .route(web::post().to(create_menu_item))
            .route(web::get().to(list_menu_items)),
    )
    .route("/menu-items/all-kitchens", web::post().to(create_for_all_kitchens))
        .route("/menu-items/{id}", web::delete().to(remove_menu_item))
        .route("/menu-items/{id}/price", web::put().to(update_price))
        .route("/menu-items/{id}/image", web::put().to(update_image));
}

#[derive(Debug, Deserialize)]
struct PriceBody {
    price: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageBody {
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AllKitchensBody {
    name: String,
    price: Decimal,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    mode: Option<BulkInsertMode>,
}

async fn create_kitchen(state: web::Data<AppState>, body: web::Json<NewKitchen>) -> Result<HttpResponse, ApiError> {
    let kitchen = state.catalog.create_kitchen(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(kitchen))
}

async fn list_kitchens(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.catalog.list_kitchens().await?))
}

async fn create_menu_item(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<NewMenuItem>,
) -> Result<HttpResponse, ApiError> {
    let item = state.catalog.create_menu_item(path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(item))
}

async fn list_menu_items(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.catalog.list_menu_items(path.into_inner()).await?))
}

async fn create_for_all_kitchens(
    state: web::Data<AppState>,
    body: web::Json<AllKitchensBody>,
) -> Result<HttpResponse, ApiError> {
    let AllKitchensBody { name, price, image_url, mode } = body.into_inner();
    let item = NewMenuItem { name, price, image_url };
    let report = state.catalog.create_menu_item_for_all_kitchens(item, mode).await?;
    Ok(HttpResponse::Ok().json(report))
}

async fn remove_menu_item(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    state.catalog.remove_menu_item(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn update_price(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<PriceBody>,
) -> Result<HttpResponse, ApiError> {
    let item = state.catalog.update_price(path.into_inner(), body.price).await?;
    Ok(HttpResponse::Ok().json(item))
}

async fn update_image(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<ImageBody>,
) -> Result<HttpResponse, ApiError> {
    let item = state
        .catalog
        .update_image(path.into_inner(), body.into_inner().image_url)
        .await?;
    Ok(HttpResponse::Ok().json(item))
}
