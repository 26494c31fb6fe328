//! Decision orchestration
//!
//! One call of [`decide_in_tx`] runs on a caller-owned write transaction:
//!
//! 1. guarded terminal transition of the approval (`WHERE status = 'pending'`)
//! 2. linked operation → `done` (approve) or `cancelled` (reject / cancel)
//! 3. missing asset operation auto-created for receive / borrow / return /
//!    dispose / inbound approvals
//! 4. asset status and owner inferred from the completed asset operation
//! 5. purchase follow-up: one pending inbound entry per purchase approval
//! 6. consumable stock effects of a completed consumable operation
//! 7. outbox event for approvals mirrored in the external task tracker
//!
//! Any error drops the transaction, so a failed decision leaves no trace.

use crate::db::repository::{approval, asset, asset_operation, outbox};
use crate::ledger::asset::{asset_required, create_in_tx, transition_in_tx};
use crate::ledger::stock;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    ApprovalDecision, ApprovalRequest, ApprovalStatus, ApprovalType, AssetCreate, AssetOperation,
    AssetOperationCreate, AssetOperationType, AssetPatch, AssetStatus, Consumable,
    OperationMetadata, OperationStatus, TodoSyncPayload, Transition,
};
use serde::Serialize;
use sqlx::SqliteConnection;

/// What a committed decision touched; drives the post-commit side effects
#[derive(Debug, Serialize)]
pub struct DecisionOutcome {
    pub approval: ApprovalRequest,
    /// Consumables whose stock changed (alert sync after commit)
    pub touched_consumables: Vec<Consumable>,
    /// Asset operation completed by this decision, if any
    pub completed_asset_operation: Option<AssetOperation>,
    /// Pending inbound entry created for a purchase
    pub follow_up_operation: Option<AssetOperation>,
    #[serde(skip)]
    pub outbox_enqueued: bool,
}

fn approval_not_found(id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::ApprovalNotFound,
        format!("Approval request {id} not found"),
    )
    .with_detail("approval_id", id)
}

pub async fn decide_in_tx(
    conn: &mut SqliteConnection,
    id: i64,
    decision: &ApprovalDecision,
) -> AppResult<DecisionOutcome> {
    let target = decision.action.target_status();
    let result = decision
        .action
        .result_text(&decision.actor_id, decision.comment.as_deref());

    // 1. approval
    let mut approval = match approval::mark_decided(
        conn,
        id,
        target,
        &result,
        decision.comment.as_deref(),
        &decision.actor_id,
    )
    .await?
    {
        Some(approval) => approval,
        None => {
            return Err(match approval::find_by_id(&mut *conn, id).await? {
                Some(existing) => AppError::approval_not_pending(id, existing.status.as_str()),
                None => approval_not_found(id),
            });
        }
    };

    let approved = target == ApprovalStatus::Approved;
    let next = if approved {
        OperationStatus::Done
    } else {
        OperationStatus::Cancelled
    };

    let mut outcome = DecisionOutcome {
        approval: approval.clone(),
        touched_consumables: Vec::new(),
        completed_asset_operation: None,
        follow_up_operation: None,
        outbox_enqueued: false,
    };

    // 2. linked asset operation
    if let Some(op_id) = approval.asset_operation_id {
        let (op, transition) = transition_in_tx(conn, op_id, next).await?;
        if transition == Transition::Complete {
            outcome.completed_asset_operation = Some(op);
        }
    } else if approved
        && approval.consumable_id.is_none()
        && approval.approval_type.requires_asset_operation()
    {
        // 3. auto-create
        let op = auto_create_operation(conn, &approval, &decision.actor_id).await?;
        approval = approval::link_asset(conn, approval.id, None, Some(op.id)).await?;
        outcome.completed_asset_operation = Some(op);
    }

    // 4. asset effects
    if let Some(op) = &outcome.completed_asset_operation {
        apply_asset_effects(conn, &approval, op).await?;
    }

    // 5. purchase follow-up
    if approved && approval.approval_type == ApprovalType::Purchase && approval.consumable_id.is_none() {
        let (linked, follow_up) = purchase_follow_up(conn, approval, &decision.actor_id).await?;
        approval = linked;
        outcome.follow_up_operation = follow_up;
    }

    // 6. consumable stock
    if let Some(op_id) = approval.consumable_operation_id {
        let (_, stock) = stock::transition_in_tx(conn, op_id, next).await?;
        outcome.touched_consumables.extend(stock);
    }

    // 7. outbox
    if let Some(payload) = TodoSyncPayload::for_approval(&approval) {
        outbox::enqueue(conn, &payload).await?;
        outcome.outbox_enqueued = true;
    }

    outcome.approval = approval;
    Ok(outcome)
}

async fn auto_create_operation(
    conn: &mut SqliteConnection,
    approval: &ApprovalRequest,
    actor_id: &str,
) -> AppResult<AssetOperation> {
    let asset_id = approval.asset_id.ok_or_else(|| asset_required(None))?;
    let op_type = approval.approval_type.asset_operation_type().ok_or_else(|| {
        AppError::internal(format!(
            "approval type {} has no asset operation",
            approval.approval_type
        ))
    })?;
    let current = asset::find_by_id(&mut *conn, asset_id)
        .await?
        .ok_or_else(|| asset_required(Some(asset_id)))?;

    let data = AssetOperationCreate {
        op_type,
        status: OperationStatus::Done,
        actor_id: actor_id.to_string(),
        from_user_id: current.owner_id,
        to_user_id: approval.metadata.target_user_id.clone(),
        amount: None,
        note: approval.reason.clone(),
        metadata: OperationMetadata::from_approval(
            approval.id,
            approval.reason.clone(),
            &approval.applicant_id,
            &approval.metadata,
        ),
    };
    let op = create_in_tx(conn, asset_id, &data, None).await?;
    tracing::debug!(
        approval_id = approval.id,
        operation_id = op.id,
        op_type = %op.op_type,
        "Auto-created asset operation for approval"
    );
    Ok(op)
}

async fn apply_asset_effects(
    conn: &mut SqliteConnection,
    approval: &ApprovalRequest,
    op: &AssetOperation,
) -> AppResult<()> {
    let patch = AssetPatch {
        status: op.op_type.inferred_asset_status(),
        owner_id: approval
            .metadata
            .target_user_id
            .clone()
            .or_else(|| op.to_user_id.clone()),
    };
    if patch.is_empty() {
        return Ok(());
    }
    let updated = asset::update(conn, op.asset_id, &patch).await?;
    tracing::debug!(
        asset_id = updated.id,
        status = %updated.status,
        owner_id = ?updated.owner_id,
        "Asset updated from approved operation"
    );
    Ok(())
}

/// Create the asset when missing, then at most one pending inbound entry
async fn purchase_follow_up(
    conn: &mut SqliteConnection,
    mut approval: ApprovalRequest,
    actor_id: &str,
) -> AppResult<(ApprovalRequest, Option<AssetOperation>)> {
    let asset_id = match approval.asset_id {
        Some(asset_id) => asset_id,
        None => {
            let name = approval
                .metadata
                .asset_name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| approval.title.clone());
            let created = asset::create(
                conn,
                AssetCreate {
                    name,
                    category: approval.metadata.asset_category.clone(),
                    status: Some(AssetStatus::PendingInbound),
                    owner_id: None,
                },
            )
            .await?;
            tracing::info!(
                approval_id = approval.id,
                asset_id = created.id,
                "Asset created for purchase"
            );
            approval = approval::link_asset(conn, approval.id, Some(created.id), None).await?;
            created.id
        }
    };

    if asset_operation::find_generated_from(&mut *conn, approval.id)
        .await?
        .is_some()
    {
        return Ok((approval, None));
    }

    let mut metadata = OperationMetadata::from_approval(
        approval.id,
        approval.reason.clone(),
        &approval.applicant_id,
        &approval.metadata,
    );
    metadata.auto_generated_from_approval_id = Some(approval.id);

    let data = AssetOperationCreate {
        op_type: AssetOperationType::Inbound,
        status: OperationStatus::Pending,
        actor_id: actor_id.to_string(),
        from_user_id: None,
        to_user_id: approval.metadata.target_user_id.clone(),
        amount: None,
        note: approval.reason.clone(),
        metadata,
    };
    let op = create_in_tx(conn, asset_id, &data, Some(approval.id)).await?;
    tracing::info!(
        approval_id = approval.id,
        operation_id = op.id,
        asset_id,
        "Inbound follow-up created for purchase"
    );
    Ok((approval, Some(op)))
}
