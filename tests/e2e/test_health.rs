use crate::e2e::helpers;

use helpers::{test_config, TestContext};
use replylens_backend::infrastructure::config::Environment;
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_ok_for_health_check(ctx: &TestContext) {
    let response = ctx.client.get("/health").await.unwrap();

    response.assert_status(StatusCode::OK);

    // Health endpoint returns plain text
    let body = String::from_utf8(response.body_bytes.clone()).unwrap();
    assert_eq!(body, "OK");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_database_and_provider_when_ready(ctx: &TestContext) {
    let response = ctx.client.get("/health/ready").await.unwrap();

    response.assert_status(StatusCode::OK);

    assert_eq!(
        response.body.as_ref().unwrap(),
        &serde_json::json!({
            "status": "ready",
            "database": "connected",
            "ai_provider": "scripted"
        })
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_not_ready_when_the_database_is_gone(ctx: &TestContext) {
    ctx.pool.close().await;

    let response = ctx.client.get("/health/ready").await.unwrap();

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["database"], "disconnected");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_include_request_id_in_responses(ctx: &TestContext) {
    let response = ctx.client.get("/health").await.unwrap();
    response.assert_header_exists("x-request-id");

    // Errors carry it too
    let response = ctx.client.get("/api/session").await.unwrap();
    response.assert_status(StatusCode::UNAUTHORIZED);
    response.assert_header_exists("x-request-id");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_handle_concurrent_health_checks(ctx: &TestContext) {
    let mut futures = Vec::new();
    for _ in 0..10 {
        let client = ctx.client.clone();
        futures.push(async move { client.get("/health").await });
    }

    let results = futures::future::join_all(futures).await;

    for result in results {
        result.unwrap().assert_status(StatusCode::OK);
    }
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_allow_any_origin_in_development(ctx: &TestContext) {
    let response = ctx
        .client
        .get_with_origin("/health", "http://localhost:5173")
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.header("access-control-allow-origin").map(String::as_str),
        Some("*")
    );
    response.assert_header_exists("x-request-id");
}

#[tokio::test]
async fn it_should_not_open_cors_in_production() {
    let mut config = test_config();
    config.environment = Environment::Production;
    let ctx = TestContext::with_config(config).await;

    let response = ctx
        .client
        .get_with_origin("/health", "http://localhost:5173")
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert!(response.header("access-control-allow-origin").is_none());
}
