//! Asset API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{
    Asset, AssetCreate, AssetOperation, AssetOperationCreate, AssetQuery, OperationQuery,
};
use shared::types::Page;

/// GET /api/assets
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<AssetQuery>,
) -> AppResult<Json<Page<Asset>>> {
    Ok(Json(state.assets.list_assets(&query).await?))
}

/// GET /api/assets/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Asset>> {
    Ok(Json(state.assets.get_asset(id).await?))
}

/// POST /api/assets
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<AssetCreate>,
) -> AppResult<Json<Asset>> {
    Ok(Json(state.assets.create_asset(payload).await?))
}

/// GET /api/assets/:id/operations - 资产操作记录
pub async fn list_operations(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<OperationQuery>,
) -> AppResult<Json<Page<AssetOperation>>> {
    Ok(Json(state.assets.list_operations(id, &query).await?))
}

/// POST /api/assets/:id/operations - 记录资产操作 (不直接修改资产)
pub async fn create_operation(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AssetOperationCreate>,
) -> AppResult<Json<AssetOperation>> {
    Ok(Json(state.assets.create_operation(id, payload).await?))
}
