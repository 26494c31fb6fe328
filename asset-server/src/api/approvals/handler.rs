//! Approval API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::approvals::DecisionOutcome;
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{
    ApprovalCreate, ApprovalDecision, ApprovalQuery, ApprovalRequest, ApproverReassign,
};
use shared::types::Page;

/// GET /api/approvals - 审批单列表 (scope=applicant|approver 需 viewer_id)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ApprovalQuery>,
) -> AppResult<Json<Page<ApprovalRequest>>> {
    Ok(Json(state.approvals.list(&query).await?))
}

/// GET /api/approvals/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApprovalRequest>> {
    Ok(Json(state.approvals.get(id).await?))
}

/// POST /api/approvals - 创建审批单
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ApprovalCreate>,
) -> AppResult<Json<ApprovalRequest>> {
    Ok(Json(state.approvals.create(payload).await?))
}

/// PUT /api/approvals/:id/approver - 改派审批人 (仅 pending)
pub async fn reassign(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ApproverReassign>,
) -> AppResult<Json<ApprovalRequest>> {
    Ok(Json(state.approvals.reassign_approver(id, payload).await?))
}

/// POST /api/approvals/:id/decision - 审批 (approve / reject / cancel)
pub async fn decide(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ApprovalDecision>,
) -> AppResult<Json<DecisionOutcome>> {
    Ok(Json(state.approvals.decide(id, payload).await?))
}
