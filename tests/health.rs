use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::Value;
use tower::ServiceExt;

use storefront_api::{
    config::AppConfig, entity::users::Role, routes, routes::health::health_check,
    services::auth_service::issue_token, state::AppState,
};
use uuid::Uuid;

fn offline_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "health-test-secret".into(),
        jwt_expiry_hours: 1,
    }
}

fn offline_app() -> axum::Router {
    let config = offline_config();
    let orm = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    routes::app(AppState::new(orm, config))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn health_check_returns_ok() {
    let response = health_check().await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert_eq!(data.service, "storefront-api");
    assert_eq!(data.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn health_route_sets_request_id() {
    let response = offline_app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn unknown_path_is_json_404() {
    let response = offline_app()
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["data"]["path"], "/nope");
}

#[tokio::test]
async fn admin_toggle_without_token_is_unauthorized() {
    let request = Request::builder()
        .method(Method::PATCH)
        .uri("/api/products/00000000-0000-0000-0000-000000000001/status")
        .body(Body::empty())
        .unwrap();
    let response = offline_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_reports_admin_session() {
    let user_id = Uuid::new_v4();
    let token = issue_token(&offline_config(), user_id, Role::Admin).expect("token");
    let request = Request::get("/api/auth/me")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = offline_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["user_id"], user_id.to_string());
    assert_eq!(body["data"]["role"], "ADMIN");
    assert_eq!(body["data"]["is_admin"], true);
}

#[tokio::test]
async fn malformed_id_is_json_bad_request() {
    let response = offline_app()
        .oneshot(Request::get("/api/products/not-a-uuid").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["data"]["kind"], "BAD_REQUEST");
    assert!(body["data"]["error"].as_str().is_some_and(|e| !e.is_empty()));
}

fn admin_post(uri: &str, body: Value) -> Request<Body> {
    let token = issue_token(&offline_config(), Uuid::new_v4(), Role::Admin).expect("token");
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn sub_cent_price_is_a_validation_error() {
    let request = admin_post(
        "/api/products",
        serde_json::json!({
            "name": "PSN $10",
            "slug": "psn-10",
            "description": "PlayStation Network wallet top-up",
            "price": "0.001",
        }),
    );
    let response = offline_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["data"]["kind"], "VALIDATION_ERROR");
    assert!(body["data"]["fields"]["price"].is_array());
}

#[tokio::test]
async fn sub_cent_discount_is_a_validation_error() {
    let request = admin_post(
        "/api/promotions",
        serde_json::json!({
            "name": "Tiny",
            "discount_type": "FIXED",
            "discount_value": "0.004",
            "start_date": "2023-06-01T00:00:00Z",
            "end_date": "2024-08-31T00:00:00Z",
        }),
    );
    let response = offline_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert!(body["data"]["fields"]["discount_value"].is_array());
}
