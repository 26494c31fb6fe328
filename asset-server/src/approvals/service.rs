//! Approval registry service (审批单)

use super::orchestrator::{self, DecisionOutcome};
use crate::alerts::{self, AlertPropagator};
use crate::core::config::ApprovalConfig;
use crate::db::begin_write;
use crate::db::repository::{approval, asset, asset_operation, consumable, consumable_operation};
use crate::ledger::asset::asset_not_found;
use crate::ledger::stock::{self, consumable_not_found, operation_not_found};
use crate::notify::OutboxHandle;
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, MAX_TITLE_LEN, validate_optional_text,
    validate_required_text,
};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    ApprovalConfigSnapshot, ApprovalCreate, ApprovalDecision, ApprovalQuery, ApprovalRequest,
    ApproverReassign, OperationStatus,
};
use shared::types::Page;
use shared::util::clamp_page;
use sqlx::SqlitePool;
use std::sync::Arc;

fn target_invalid(msg: impl Into<String>) -> AppError {
    AppError::with_message(ErrorCode::ApprovalTargetInvalid, msg)
}

#[derive(Clone)]
pub struct ApprovalService {
    pool: SqlitePool,
    config: ApprovalConfig,
    alerts: Arc<dyn AlertPropagator>,
    outbox: OutboxHandle,
}

impl ApprovalService {
    pub fn new(
        pool: SqlitePool,
        config: ApprovalConfig,
        alerts: Arc<dyn AlertPropagator>,
        outbox: OutboxHandle,
    ) -> Self {
        Self {
            pool,
            config,
            alerts,
            outbox,
        }
    }

    /// Resolve the approver: payload → configured default
    fn resolve_approver(&self, requested: Option<String>) -> AppResult<Option<String>> {
        let approver = requested
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .or_else(|| self.config.default_approver_id.clone());
        if approver.is_none() && self.config.require_approver {
            return Err(AppError::new(ErrorCode::ApproverRequired));
        }
        Ok(approver)
    }

    /// Create a pending request and push its linked operation to `pending`
    pub async fn create(&self, mut data: ApprovalCreate) -> AppResult<ApprovalRequest> {
        validate_required_text(&data.title, "title", MAX_TITLE_LEN)?;
        validate_required_text(&data.applicant_id, "applicant_id", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&data.reason, "reason", MAX_NOTE_LEN)?;
        validate_optional_text(&data.approver_id, "approver_id", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&data.external_todo_id, "external_todo_id", MAX_SHORT_TEXT_LEN)?;

        if data.asset_id.is_some() && data.consumable_id.is_some() {
            return Err(target_invalid("approval may target an asset or a consumable, not both"));
        }
        if data.asset_operation_id.is_some() && data.consumable_operation_id.is_some() {
            return Err(target_invalid("approval may link at most one operation"));
        }

        data.approver_id = self.resolve_approver(data.approver_id.take())?;

        let mut tx = begin_write(&self.pool).await?;

        if let Some(op_id) = data.asset_operation_id {
            let op = asset_operation::find_by_id(&mut *tx, op_id)
                .await?
                .ok_or_else(|| operation_not_found(op_id))?;
            if data.consumable_id.is_some() {
                return Err(target_invalid("asset operation linked to a consumable approval"));
            }
            if data.approval_type.asset_operation_type() != Some(op.op_type) {
                return Err(target_invalid(format!(
                    "{} approval cannot gate a {} operation",
                    data.approval_type, op.op_type
                ))
                .with_detail("operation_id", op_id));
            }
            match data.asset_id {
                Some(asset_id) if asset_id != op.asset_id => {
                    return Err(target_invalid(format!(
                        "operation {op_id} belongs to asset {}, not {asset_id}",
                        op.asset_id
                    )));
                }
                _ => data.asset_id = Some(op.asset_id),
            }
        }
        if let Some(op_id) = data.consumable_operation_id {
            let op = consumable_operation::find_by_id(&mut *tx, op_id)
                .await?
                .ok_or_else(|| operation_not_found(op_id))?;
            if data.asset_id.is_some() {
                return Err(target_invalid("consumable operation linked to an asset approval"));
            }
            if data.approval_type.consumable_operation_type() != Some(op.op_type) {
                return Err(target_invalid(format!(
                    "{} approval cannot gate a {} operation",
                    data.approval_type, op.op_type
                ))
                .with_detail("operation_id", op_id));
            }
            match data.consumable_id {
                Some(consumable_id) if consumable_id != op.consumable_id => {
                    return Err(target_invalid(format!(
                        "operation {op_id} belongs to consumable {}, not {consumable_id}",
                        op.consumable_id
                    )));
                }
                _ => data.consumable_id = Some(op.consumable_id),
            }
        }

        if let Some(asset_id) = data.asset_id
            && asset::find_by_id(&mut *tx, asset_id).await?.is_none()
        {
            return Err(asset_not_found(asset_id));
        }
        if let Some(consumable_id) = data.consumable_id
            && consumable::find_by_id(&mut *tx, consumable_id).await?.is_none()
        {
            return Err(consumable_not_found(consumable_id));
        }

        data.metadata.config_snapshot = Some(ApprovalConfigSnapshot {
            require_approver: self.config.require_approver,
            default_approver_id: self.config.default_approver_id.clone(),
            captured_at: shared::util::now_millis(),
        });

        let created = approval::create(&mut tx, &data).await?;

        // A re-submitted cancelled entry goes back to pending; a done one is final
        if let Some(op_id) = created.asset_operation_id {
            crate::ledger::asset::transition_in_tx(&mut tx, op_id, OperationStatus::Pending).await?;
        }
        if let Some(op_id) = created.consumable_operation_id {
            stock::transition_in_tx(&mut tx, op_id, OperationStatus::Pending).await?;
        }
        tx.commit().await?;

        tracing::info!(
            approval_id = created.id,
            approval_type = %created.approval_type,
            applicant_id = %created.applicant_id,
            approver_id = ?created.approver_id,
            "Approval request created"
        );
        Ok(created)
    }

    pub async fn get(&self, id: i64) -> AppResult<ApprovalRequest> {
        approval::find_by_id(&self.pool, id).await?.ok_or_else(|| {
            AppError::with_message(
                ErrorCode::ApprovalNotFound,
                format!("Approval request {id} not found"),
            )
            .with_detail("approval_id", id)
        })
    }

    pub async fn list(&self, query: &ApprovalQuery) -> AppResult<Page<ApprovalRequest>> {
        let viewer_missing = query
            .viewer_id
            .as_deref()
            .is_none_or(|v| v.trim().is_empty());
        if query.scope.is_some() && viewer_missing {
            return Err(AppError::validation("viewer_id is required when scope is set")
                .with_detail("field", "viewer_id"));
        }
        let (offset, limit) = clamp_page(query.offset, query.limit);
        let (items, total) = approval::find_all(&self.pool, query, offset, limit).await?;
        Ok(Page::new(items, total, offset, limit))
    }

    /// Change the approver of a pending request
    pub async fn reassign_approver(
        &self,
        id: i64,
        data: ApproverReassign,
    ) -> AppResult<ApprovalRequest> {
        validate_required_text(&data.approver_id, "approver_id", MAX_SHORT_TEXT_LEN)?;

        let mut tx = begin_write(&self.pool).await?;
        let updated = match approval::set_approver(&mut tx, id, data.approver_id.trim()).await? {
            Some(updated) => updated,
            None => {
                let existing = approval::find_by_id(&mut *tx, id).await?;
                return Err(match existing {
                    Some(existing) => AppError::approval_not_pending(id, existing.status.as_str()),
                    None => AppError::new(ErrorCode::ApprovalNotFound).with_detail("approval_id", id),
                });
            }
        };
        tx.commit().await?;

        tracing::info!(approval_id = id, approver_id = ?updated.approver_id, "Approver reassigned");
        Ok(updated)
    }

    /// Approve / reject / cancel. Alert sync and outbox wake-up run after commit.
    pub async fn decide(&self, id: i64, decision: ApprovalDecision) -> AppResult<DecisionOutcome> {
        validate_required_text(&decision.actor_id, "actor_id", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&decision.comment, "comment", MAX_NOTE_LEN)?;

        let mut tx = begin_write(&self.pool).await?;
        let outcome = orchestrator::decide_in_tx(&mut tx, id, &decision).await?;
        tx.commit().await?;

        tracing::info!(
            approval_id = id,
            status = %outcome.approval.status,
            actor_id = %decision.actor_id,
            follow_up = ?outcome.follow_up_operation.as_ref().map(|op| op.id),
            "Approval decided"
        );

        for touched in &outcome.touched_consumables {
            alerts::sync_best_effort(self.alerts.as_ref(), touched).await;
        }
        if outcome.outbox_enqueued {
            self.outbox.wake();
        }
        Ok(outcome)
    }
}
