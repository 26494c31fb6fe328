//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`approvals`] - 审批单
//! - [`assets`] - 资产与资产操作记录
//! - [`asset_operations`] - 资产操作状态
//! - [`consumables`] - 耗材、出入库记录、库存预警
//! - [`consumable_operations`] - 耗材操作状态
//! - [`inventory_tasks`] - 盘点任务
//! - [`notifications`] - 外部待办 outbox

pub mod approvals;
pub mod asset_operations;
pub mod assets;
pub mod consumable_operations;
pub mod consumables;
pub mod health;
pub mod inventory_tasks;
pub mod notifications;

use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    tracing::info!(target: "http_access", "{} {} {}", method, uri, response.status());
    response
}

/// Build the Axum router (without state)
pub fn build_router() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(approvals::router())
        .merge(assets::router())
        .merge(asset_operations::router())
        .merge(consumables::router())
        .merge(consumable_operations::router())
        .merge(inventory_tasks::router())
        .merge(notifications::router())
}

/// Fully configured app with middleware and state
pub fn build_app(state: ServerState) -> Router {
    build_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(log_request))
}
