//! Consumable Operation API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{ConsumableOperation, OperationStatusUpdate};

/// GET /api/consumable-operations/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ConsumableOperation>> {
    Ok(Json(state.consumables.get_operation(id).await?))
}

/// PUT /api/consumable-operations/:id/status - pending → done 时应用库存变化
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<OperationStatusUpdate>,
) -> AppResult<Json<ConsumableOperation>> {
    Ok(Json(
        state
            .consumables
            .update_operation_status(id, payload.status)
            .await?,
    ))
}
