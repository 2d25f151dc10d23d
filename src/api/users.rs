use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use super::{ApiError, AppState};
use crate::domain::identity::UserUpsert;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/users", web::put().to(upsert_user))
        .route("/users/{email}", web::get().to(find_user))
        .route("/auth/sign-up", web::post().to(sign_up))
        .route("/auth/sign-in", web::post().to(sign_in))
        .route("/auth/sign-out", web::post().to(sign_out))
        .route("/auth/session", web::get().to(current_session));
}

#[derive(Debug, Deserialize)]
struct EmailBody {
    email: String,
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

async fn upsert_user(state: web::Data<AppState>, body: web::Json<UserUpsert>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.identity.upsert_user(body.into_inner()).await?))
}

async fn find_user(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    // Unknown emails yield a null body
    Ok(HttpResponse::Ok().json(state.identity.find_user(&path).await?))
}

async fn sign_up(state: web::Data<AppState>, body: web::Json<EmailBody>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Created().json(state.identity.sign_up(&body.email).await?))
}

async fn sign_in(state: web::Data<AppState>, body: web::Json<EmailBody>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.identity.sign_in(&body.email).await?))
}

async fn sign_out(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let token = bearer_token(&req).ok_or_else(ApiError::unauthorized)?;
    let signed_out = state.identity.sign_out(token).await;
    Ok(HttpResponse::Ok().json(json!({ "signedOut": signed_out })))
}

async fn current_session(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let token = bearer_token(&req).ok_or_else(ApiError::unauthorized)?;
    let session = state
        .identity
        .current_session(token)
        .await
        .ok_or_else(ApiError::unauthorized)?;
    Ok(HttpResponse::Ok().json(session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_session_flow() {
        let app = test::init_service(App::new().app_data(test_support::state()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/auth/sign-up")
            .set_json(json!({"email": "diner@mail.in"}))
            .to_request();
        let user: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(user["role"], "CUSTOMER");

        let req = test::TestRequest::post()
            .uri("/auth/sign-in")
            .set_json(json!({"email": "diner@mail.in"}))
            .to_request();
        let session: Value = test::call_and_read_body_json(&app, req).await;
        let token = session["token"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri("/auth/session")
            .insert_header((AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let current: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(current["user"]["email"], "diner@mail.in");

        let req = test::TestRequest::post()
            .uri("/auth/sign-out")
            .insert_header((AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["signedOut"], true);

        let req = test::TestRequest::get()
            .uri("/auth/session")
            .insert_header((AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_admin_invite() {
        let app = test::init_service(App::new().app_data(test_support::state()).configure(configure)).await;

        let req = test::TestRequest::put()
            .uri("/users")
            .set_json(json!({"email": "chef@el-chaplo.in", "role": "KITCHEN", "brandSlug": "el-chaplo"}))
            .to_request();
        let user: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(user["role"], "KITCHEN");

        let req = test::TestRequest::get().uri("/users/chef@el-chaplo.in").to_request();
        let found: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(found["brandSlug"], "el-chaplo");

        let req = test::TestRequest::put()
            .uri("/users")
            .set_json(json!({"email": "x@y.in", "role": "CUSTOMER"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
