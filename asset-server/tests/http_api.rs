//! HTTP 层: 路由 + JSON 编解码 + 错误码映射

use axum::Router;
use axum::body::{Body, to_bytes};
use http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use asset_server::api::build_app;
use asset_server::db::DbService;
use asset_server::{Config, ServerState};

async fn app() -> Router {
    let db = DbService::in_memory().await.expect("in-memory database");
    build_app(ServerState::new(Config::for_tests("./target/test-data"), db.pool))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_database() {
    let app = app().await;
    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn borrow_approval_over_http() {
    let app = app().await;

    let (status, asset) = call(
        &app,
        Method::POST,
        "/api/assets",
        Some(json!({ "name": "Projector", "category": "av" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let asset_id = asset["id"].as_i64().expect("asset id");

    let (status, op) = call(
        &app,
        Method::POST,
        &format!("/api/assets/{asset_id}/operations"),
        Some(json!({
            "op_type": "borrow",
            "status": "pending",
            "actor_id": "dave",
            "to_user_id": "dave"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let op_id = op["id"].as_i64().expect("operation id");

    let (status, approval) = call(
        &app,
        Method::POST,
        "/api/approvals",
        Some(json!({
            "approval_type": "borrow",
            "title": "Borrow projector",
            "applicant_id": "dave",
            "approver_id": "erin",
            "asset_operation_id": op_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approval["asset_id"].as_i64(), Some(asset_id));
    let approval_id = approval["id"].as_i64().expect("approval id");

    let (status, outcome) = call(
        &app,
        Method::POST,
        &format!("/api/approvals/{approval_id}/decision"),
        Some(json!({ "action": "approve", "actor_id": "erin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["approval"]["status"], "approved");
    assert_eq!(outcome["completed_asset_operation"]["status"], "done");

    let (_, asset) = call(&app, Method::GET, &format!("/api/assets/{asset_id}"), None).await;
    assert_eq!(asset["status"], "borrowing");
    assert_eq!(asset["owner_id"], "dave");

    // 已决审批不能再次决策
    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/approvals/{approval_id}/decision"),
        Some(json!({ "action": "reject", "actor_id": "erin" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["code"].is_number());
}

#[tokio::test]
async fn overdraw_maps_to_unprocessable() {
    let app = app().await;

    let (status, paper) = call(
        &app,
        Method::POST,
        "/api/consumables",
        Some(json!({ "name": "A4 paper", "initial_quantity": 5, "actor_id": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = paper["id"].as_i64().expect("consumable id");

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/api/consumables/{id}/operations"),
        Some(json!({
            "op_type": "outbound",
            "status": "done",
            "quantity_delta": -6,
            "actor_id": "u-1"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, page) = call(&app, Method::GET, &format!("/api/consumables/{id}/operations"), None).await;
    assert_eq!(page["total"], 1);
}

#[tokio::test]
async fn unknown_approval_is_not_found() {
    let app = app().await;
    let (status, _) = call(&app, Method::GET, "/api/approvals/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
