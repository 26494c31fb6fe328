//! Inventory Task API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{
    InventoryTask, InventoryTaskCreate, InventoryTaskDetail, InventoryTaskQuery,
    InventoryTaskUpdate,
};
use shared::types::Page;

/// GET /api/inventory-tasks
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<InventoryTaskQuery>,
) -> AppResult<Json<Page<InventoryTask>>> {
    Ok(Json(state.inventory.list_tasks(&query).await?))
}

/// GET /api/inventory-tasks/:id - 任务 + 明细 + 汇总
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<InventoryTaskDetail>> {
    Ok(Json(state.inventory.get_task(id).await?))
}

/// POST /api/inventory-tasks - 按筛选条件生成盘点快照
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<InventoryTaskCreate>,
) -> AppResult<Json<InventoryTaskDetail>> {
    Ok(Json(state.inventory.create_task(payload).await?))
}

/// PUT /api/inventory-tasks/:id - 改名 / 推进状态 / 批量录入实盘数
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<InventoryTaskUpdate>,
) -> AppResult<Json<InventoryTaskDetail>> {
    Ok(Json(state.inventory.update_task(id, payload).await?))
}
