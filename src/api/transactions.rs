use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::{ApiError, AppState};
use crate::domain::ledger::NewTransaction;
use crate::models::TransactionStatus;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/transactions", web::post().to(create_transaction))
        .route("/transactions/{id}/status", web::put().to(mark_status))
        .route("/kitchens/{id}/transactions", web::get().to(list_by_kitchen));
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: TransactionStatus,
}

async fn create_transaction(
    state: web::Data<AppState>,
    body: web::Json<NewTransaction>,
) -> Result<HttpResponse, ApiError> {
    let id = state.ledger.create(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "id": id })))
}

async fn mark_status(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<StatusBody>,
) -> Result<HttpResponse, ApiError> {
    let transaction = state.ledger.mark_status(path.into_inner(), body.status).await?;
    Ok(HttpResponse::Ok().json(transaction))
}

async fn list_by_kitchen(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.ledger.list_by_kitchen(path.into_inner()).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_idempotent_create_and_settle() {
        let app = test::init_service(App::new().app_data(test_support::state()).configure(configure)).await;
        let kitchen_id = Uuid::new_v4();
        let body = json!({"amount": 540, "kitchenId": kitchen_id, "idempotencyKey": "upi-7781"});

        let req = test::TestRequest::post().uri("/transactions").set_json(&body).to_request();
        let first: Value = test::call_and_read_body_json(&app, req).await;
        let req = test::TestRequest::post().uri("/transactions").set_json(&body).to_request();
        let second: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(first["id"], second["id"]);

        let req = test::TestRequest::put()
            .uri(&format!("/transactions/{}/status", first["id"].as_str().unwrap()))
            .set_json(json!({"status": "SUCCESS"}))
            .to_request();
        let settled: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(settled["status"], "SUCCESS");
        assert_eq!(settled["currency"], "INR");

        let req = test::TestRequest::put()
            .uri(&format!("/transactions/{}/status", first["id"].as_str().unwrap()))
            .set_json(json!({"status": "PENDING"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let req = test::TestRequest::get()
            .uri(&format!("/kitchens/{}/transactions", kitchen_id))
            .to_request();
        let listed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }
}
