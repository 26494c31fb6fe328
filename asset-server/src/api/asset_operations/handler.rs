//! Asset Operation API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{AssetOperation, OperationStatusUpdate};

/// GET /api/asset-operations/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AssetOperation>> {
    Ok(Json(state.assets.get_operation(id).await?))
}

/// PUT /api/asset-operations/:id/status - done 为终态
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<OperationStatusUpdate>,
) -> AppResult<Json<AssetOperation>> {
    Ok(Json(
        state
            .assets
            .update_operation_status(id, payload.status)
            .await?,
    ))
}
