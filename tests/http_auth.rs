//! HTTP surface tests that run without a database: the health endpoint and
//! the admin-key gate, which rejects before any handler body executes.

use actix_web::dev::ServiceResponse;
use actix_web::{App, test, web};
use serde_json::Value;

use ficha_server::api;
use ficha_server::auth::AdminKey;

const TEST_ADMIN_KEY: &str = "test-admin-key";

async fn create_test_app() -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    let admin_key = AdminKey::new(Some(TEST_ADMIN_KEY.to_string()));

    test::init_service(
        App::new().app_data(web::Data::new(admin_key)).service(
            web::scope("/api/v1")
                .configure(api::configure_health_routes)
                .configure(api::configure_user_routes),
        ),
    )
    .await
}

fn user_payload() -> Value {
    serde_json::json!({
        "email": "ana@uni.cl",
        "first_name": "Ana",
        "last_name": "Rojas",
        "role": "STUDENT"
    })
}

#[actix_rt::test]
async fn test_health_reports_healthy() {
    let app = create_test_app().await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[actix_rt::test]
async fn test_create_user_requires_admin_key() {
    let app = create_test_app().await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(user_payload())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), actix_http::StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[actix_rt::test]
async fn test_create_user_rejects_wrong_admin_key() {
    let app = create_test_app().await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .insert_header(("X-Admin-Key", "not-the-key"))
        .set_json(user_payload())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), actix_http::StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_revoke_tokens_requires_admin_key() {
    let app = create_test_app().await;

    let req = test::TestRequest::post()
        .uri(&format!(
            "/api/v1/users/{}/revoke-tokens",
            uuid::Uuid::nil()
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), actix_http::StatusCode::UNAUTHORIZED);
}
