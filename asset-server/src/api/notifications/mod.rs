//! Notification API 模块 (外部待办 outbox 查看)

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/notifications/outbox", get(handler::list_outbox))
}
