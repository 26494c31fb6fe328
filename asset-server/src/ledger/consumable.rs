//! Consumable stock ledger service (耗材)

use super::stock::{self, consumable_not_found, operation_not_found};
use crate::alerts::{self, AlertPropagator};
use crate::db::begin_write;
use crate::db::repository::{alert, consumable, consumable_operation};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_non_negative, validate_optional_text,
    validate_required_text,
};
use shared::error::AppResult;
use shared::models::{
    AlertStatus, Consumable, ConsumableAlert, ConsumableCreate, ConsumableOperation,
    ConsumableOperationCreate, ConsumableOperationType, ConsumableQuery, ConsumableStatus,
    OperationMetadata, OperationQuery, OperationStatus,
};
use shared::types::Page;
use shared::util::clamp_page;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct ConsumableLedger {
    pool: SqlitePool,
    alerts: Arc<dyn AlertPropagator>,
}

impl ConsumableLedger {
    pub fn new(pool: SqlitePool, alerts: Arc<dyn AlertPropagator>) -> Self {
        Self { pool, alerts }
    }

    /// Create a consumable; initial stock is booked as a `done` inbound entry
    pub async fn create_consumable(&self, data: ConsumableCreate) -> AppResult<Consumable> {
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_optional_text(&data.category, "category", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&data.unit, "unit", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&data.keeper_id, "keeper_id", MAX_SHORT_TEXT_LEN)?;
        validate_required_text(&data.actor_id, "actor_id", MAX_SHORT_TEXT_LEN)?;
        validate_non_negative(data.safety_stock, "safety_stock")?;
        validate_non_negative(data.initial_quantity, "initial_quantity")?;

        let mut tx = begin_write(&self.pool).await?;
        let mut created = consumable::create(&mut tx, &data).await?;

        if data.initial_quantity > 0 {
            let inbound = ConsumableOperationCreate {
                op_type: ConsumableOperationType::Inbound,
                status: OperationStatus::Done,
                quantity_delta: data.initial_quantity,
                reserved_delta: 0,
                actor_id: data.actor_id.clone(),
                note: Some("Initial stock".into()),
                metadata: OperationMetadata::default(),
            };
            if let (_, Some(stocked)) = stock::create_in_tx(&mut tx, created.id, &inbound).await? {
                created = stocked;
            }
        }
        tx.commit().await?;

        tracing::info!(
            consumable_id = created.id,
            name = %created.name,
            quantity = created.quantity,
            "Consumable created"
        );
        alerts::sync_best_effort(self.alerts.as_ref(), &created).await;
        Ok(created)
    }

    pub async fn get_consumable(&self, id: i64) -> AppResult<Consumable> {
        consumable::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| consumable_not_found(id))
    }

    pub async fn list_consumables(&self, query: &ConsumableQuery) -> AppResult<Page<Consumable>> {
        let (offset, limit) = clamp_page(query.offset, query.limit);
        let (items, total) = consumable::find_all(&self.pool, query, offset, limit).await?;
        Ok(Page::new(items, total, offset, limit))
    }

    /// Archive (sticky) or unarchive (status re-derived from stock)
    pub async fn set_archived(&self, id: i64, archived: bool) -> AppResult<Consumable> {
        let mut tx = begin_write(&self.pool).await?;
        let current = consumable::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| consumable_not_found(id))?;

        let status = if archived {
            ConsumableStatus::Archived
        } else {
            // Re-derive as if never archived
            ConsumableStatus::derive(
                ConsumableStatus::InStock,
                current.quantity,
                current.reserved_quantity,
                current.safety_stock,
            )
        };
        let updated = consumable::set_status(&mut tx, id, status).await?;
        tx.commit().await?;

        tracing::info!(consumable_id = id, status = %updated.status, "Consumable archive flag changed");
        alerts::sync_best_effort(self.alerts.as_ref(), &updated).await;
        Ok(updated)
    }

    /// Delete a consumable with its ledger; open alerts are resolved
    pub async fn delete_consumable(&self, id: i64) -> AppResult<()> {
        if !consumable::delete(&self.pool, id).await? {
            return Err(consumable_not_found(id));
        }
        tracing::info!(consumable_id = id, "Consumable deleted");

        if let Err(e) = self.alerts.resolve_alerts_for_consumable(id).await {
            tracing::warn!(consumable_id = id, error = %e, "Failed to resolve alerts of deleted consumable");
        }
        Ok(())
    }

    /// Record a stock action. `done` applies stock effects in the same transaction.
    pub async fn create_operation(
        &self,
        consumable_id: i64,
        data: ConsumableOperationCreate,
    ) -> AppResult<ConsumableOperation> {
        validate_required_text(&data.actor_id, "actor_id", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&data.note, "note", MAX_NOTE_LEN)?;

        let mut tx = begin_write(&self.pool).await?;
        let (op, stock) = stock::create_in_tx(&mut tx, consumable_id, &data).await?;
        tx.commit().await?;

        tracing::info!(
            operation_id = op.id,
            consumable_id,
            op_type = %op.op_type,
            status = %op.status,
            quantity_delta = op.quantity_delta,
            reserved_delta = op.reserved_delta,
            "Consumable operation recorded"
        );
        if let Some(c) = stock {
            alerts::sync_best_effort(self.alerts.as_ref(), &c).await;
        }
        Ok(op)
    }

    pub async fn get_operation(&self, id: i64) -> AppResult<ConsumableOperation> {
        consumable_operation::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| operation_not_found(id))
    }

    /// Guarded status change; pending → done applies effects once
    pub async fn update_operation_status(
        &self,
        id: i64,
        next: OperationStatus,
    ) -> AppResult<ConsumableOperation> {
        let mut tx = begin_write(&self.pool).await?;
        let (op, stock) = stock::transition_in_tx(&mut tx, id, next).await?;
        tx.commit().await?;

        tracing::info!(operation_id = id, status = %op.status, "Consumable operation status updated");
        if let Some(c) = stock {
            alerts::sync_best_effort(self.alerts.as_ref(), &c).await;
        }
        Ok(op)
    }

    pub async fn list_operations(
        &self,
        consumable_id: i64,
        query: &OperationQuery,
    ) -> AppResult<Page<ConsumableOperation>> {
        self.get_consumable(consumable_id).await?;
        let (offset, limit) = clamp_page(query.offset, query.limit);
        let (items, total) =
            consumable_operation::find_by_consumable(&self.pool, consumable_id, query, offset, limit)
                .await?;
        Ok(Page::new(items, total, offset, limit))
    }

    pub async fn list_alerts(
        &self,
        consumable_id: i64,
        status: Option<AlertStatus>,
    ) -> AppResult<Vec<ConsumableAlert>> {
        Ok(alert::find_by_consumable(&self.pool, consumable_id, status).await?)
    }
}
