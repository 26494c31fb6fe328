//! Consumable API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{
    AlertStatus, Consumable, ConsumableAlert, ConsumableArchive, ConsumableCreate,
    ConsumableOperation, ConsumableOperationCreate, ConsumableQuery, OperationQuery,
};
use shared::types::Page;

/// Query params for listing alerts
#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    pub status: Option<AlertStatus>,
}

/// GET /api/consumables
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ConsumableQuery>,
) -> AppResult<Json<Page<Consumable>>> {
    Ok(Json(state.consumables.list_consumables(&query).await?))
}

/// GET /api/consumables/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Consumable>> {
    Ok(Json(state.consumables.get_consumable(id).await?))
}

/// POST /api/consumables - 初始库存记为 done 入库记录
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ConsumableCreate>,
) -> AppResult<Json<Consumable>> {
    Ok(Json(state.consumables.create_consumable(payload).await?))
}

/// PUT /api/consumables/:id/archive - 归档 / 取消归档
pub async fn set_archived(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ConsumableArchive>,
) -> AppResult<Json<Consumable>> {
    Ok(Json(
        state.consumables.set_archived(id, payload.archived).await?,
    ))
}

/// DELETE /api/consumables/:id
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    state.consumables.delete_consumable(id).await?;
    Ok(Json(true))
}

/// GET /api/consumables/:id/operations
pub async fn list_operations(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<OperationQuery>,
) -> AppResult<Json<Page<ConsumableOperation>>> {
    Ok(Json(state.consumables.list_operations(id, &query).await?))
}

/// POST /api/consumables/:id/operations - done 状态立即生效
pub async fn create_operation(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ConsumableOperationCreate>,
) -> AppResult<Json<ConsumableOperation>> {
    Ok(Json(state.consumables.create_operation(id, payload).await?))
}

/// GET /api/consumables/:id/alerts
pub async fn list_alerts(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<AlertQuery>,
) -> AppResult<Json<Vec<ConsumableAlert>>> {
    Ok(Json(state.consumables.list_alerts(id, query.status).await?))
}
