use actix_web::{web, HttpResponse};
use serde_json::json;

use super::{ApiError, AppState};
use crate::domain::discount::{DiscountFilter, NewDiscount, PriceRequest};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/discounts")
            .route(web::post().to(create_discount))
            .route(web::get().to(list_discounts)),
    )
    .route("/discounts/validate", web::post().to(validate_and_price));
}

async fn create_discount(state: web::Data<AppState>, body: web::Json<NewDiscount>) -> Result<HttpResponse, ApiError> {
    let id = state.discounts.create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({ "id": id })))
}

async fn list_discounts(
    state: web::Data<AppState>,
    filter: web::Query<DiscountFilter>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.discounts.list(&filter).await?))
}

/// Rejections are part of a 200 response; only an unpriceable subtotal or a
/// store failure is an error
async fn validate_and_price(
    state: web::Data<AppState>,
    body: web::Json<PriceRequest>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.discounts.validate_and_price(&body).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_create_and_validate() {
        let app = test::init_service(App::new().app_data(test_support::state()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/discounts")
            .set_json(json!({"code": "FEAST10", "scope": "GLOBAL", "type": "PERCENT", "value": 10}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/discounts")
            .set_json(json!({"code": "FEAST10", "scope": "GLOBAL", "type": "AMOUNT", "value": 5}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::post()
            .uri("/discounts/validate")
            .set_json(json!({"code": "FEAST10", "subtotal": 1000}))
            .to_request();
        let quote: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(quote["valid"], true);
        assert_eq!(quote["discountAmount"].as_f64(), Some(100.0));
        assert_eq!(quote["total"].as_f64(), Some(900.0));

        let req = test::TestRequest::post()
            .uri("/discounts/validate")
            .set_json(json!({"code": "NOPE", "subtotal": 1000}))
            .to_request();
        let quote: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(quote["valid"], false);
        assert_eq!(quote["reason"], "invalid");
    }

    #[actix_web::test]
    async fn test_list_filter_from_query() {
        let app = test::init_service(App::new().app_data(test_support::state()).configure(configure)).await;

        for body in [
            json!({"code": "ALL5", "scope": "GLOBAL", "type": "AMOUNT", "value": 5}),
            json!({"code": "BRAND5", "scope": "BRAND", "brandSlug": "booms-pizza", "type": "AMOUNT", "value": 5}),
        ] {
            let req = test::TestRequest::post().uri("/discounts").set_json(body).to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::get()
            .uri("/discounts?scope=BRAND&brandSlug=booms-pizza")
            .to_request();
        let listed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["code"], "BRAND5");
    }

    #[actix_web::test]
    async fn test_negative_subtotal_is_unprocessable() {
        let app = test::init_service(App::new().app_data(test_support::state()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/discounts")
            .set_json(json!({"code": "BIG", "scope": "GLOBAL", "type": "AMOUNT", "value": 5}))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/discounts/validate")
            .set_json(json!({"code": "BIG", "subtotal": -10}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
