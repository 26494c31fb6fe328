//! Consumable API 模块 (耗材 + 出入库记录 + 库存预警)

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/consumables", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete))
        .route("/{id}/archive", put(handler::set_archived))
        .route(
            "/{id}/operations",
            get(handler::list_operations).post(handler::create_operation),
        )
        .route("/{id}/alerts", get(handler::list_alerts))
}
