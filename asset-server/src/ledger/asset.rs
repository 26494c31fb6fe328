//! Asset directory and asset operation ledger (资产)
//!
//! Ledger entries never mutate the asset themselves; asset status and owner
//! change only when an approval decision is orchestrated.

use super::stock::operation_not_found;
use crate::db::begin_write;
use crate::db::repository::{asset, asset_operation};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_non_negative_amount,
    validate_optional_text, validate_required_text,
};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    Asset, AssetCreate, AssetOperation, AssetOperationCreate, AssetQuery, OperationQuery,
    OperationStatus, Transition,
};
use shared::types::Page;
use shared::util::clamp_page;
use sqlx::{SqliteConnection, SqlitePool};

pub(crate) fn asset_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::AssetNotFound, format!("Asset {id} not found"))
        .with_detail("asset_id", id)
}

pub(crate) fn asset_required(id: Option<i64>) -> AppError {
    let err = AppError::new(ErrorCode::AssetRequired);
    match id {
        Some(id) => err.with_detail("asset_id", id),
        None => err,
    }
}

/// Insert an entry for an existing asset
pub async fn create_in_tx(
    conn: &mut SqliteConnection,
    asset_id: i64,
    data: &AssetOperationCreate,
    generated_from_approval_id: Option<i64>,
) -> AppResult<AssetOperation> {
    if data.status == OperationStatus::Cancelled {
        return Err(AppError::validation(
            "operation must be created as pending or done",
        ));
    }
    if asset::find_by_id(&mut *conn, asset_id).await?.is_none() {
        return Err(asset_required(Some(asset_id)));
    }
    Ok(asset_operation::create(conn, asset_id, data, generated_from_approval_id).await?)
}

/// Guarded status change through the transition table
pub async fn transition_in_tx(
    conn: &mut SqliteConnection,
    operation_id: i64,
    next: OperationStatus,
) -> AppResult<(AssetOperation, Transition)> {
    let op = asset_operation::find_by_id(&mut *conn, operation_id)
        .await?
        .ok_or_else(|| operation_not_found(operation_id))?;

    let transition = op.status.transition_to(next)?;
    if transition == Transition::Unchanged {
        return Ok((op, transition));
    }
    let updated = asset_operation::set_status(conn, op.id, op.status, next)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InvalidStatusTransition))?;
    Ok((updated, transition))
}

#[derive(Clone)]
pub struct AssetLedger {
    pool: SqlitePool,
}

impl AssetLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_asset(&self, data: AssetCreate) -> AppResult<Asset> {
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_optional_text(&data.category, "category", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&data.owner_id, "owner_id", MAX_SHORT_TEXT_LEN)?;

        let mut tx = begin_write(&self.pool).await?;
        let created = asset::create(&mut tx, data).await?;
        tx.commit().await?;
        tracing::info!(asset_id = created.id, name = %created.name, "Asset created");
        Ok(created)
    }

    pub async fn get_asset(&self, id: i64) -> AppResult<Asset> {
        asset::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| asset_not_found(id))
    }

    pub async fn list_assets(&self, query: &AssetQuery) -> AppResult<Page<Asset>> {
        let (offset, limit) = clamp_page(query.offset, query.limit);
        let (items, total) = asset::find_all(&self.pool, query, offset, limit).await?;
        Ok(Page::new(items, total, offset, limit))
    }

    /// Record an action. Status is the caller's: `pending` when an approval
    /// will gate it, `done` otherwise.
    pub async fn create_operation(
        &self,
        asset_id: i64,
        data: AssetOperationCreate,
    ) -> AppResult<AssetOperation> {
        validate_required_text(&data.actor_id, "actor_id", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&data.from_user_id, "from_user_id", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&data.to_user_id, "to_user_id", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&data.note, "note", MAX_NOTE_LEN)?;
        validate_non_negative_amount(data.amount, "amount")?;

        let mut tx = begin_write(&self.pool).await?;
        let op = create_in_tx(&mut tx, asset_id, &data, None).await?;
        tx.commit().await?;

        tracing::info!(
            operation_id = op.id,
            asset_id,
            op_type = %op.op_type,
            status = %op.status,
            "Asset operation recorded"
        );
        Ok(op)
    }

    pub async fn get_operation(&self, id: i64) -> AppResult<AssetOperation> {
        asset_operation::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| operation_not_found(id))
    }

    pub async fn update_operation_status(
        &self,
        id: i64,
        next: OperationStatus,
    ) -> AppResult<AssetOperation> {
        let mut tx = begin_write(&self.pool).await?;
        let (op, _) = transition_in_tx(&mut tx, id, next).await?;
        tx.commit().await?;
        tracing::info!(operation_id = id, status = %op.status, "Asset operation status updated");
        Ok(op)
    }

    pub async fn list_operations(
        &self,
        asset_id: i64,
        query: &OperationQuery,
    ) -> AppResult<Page<AssetOperation>> {
        self.get_asset(asset_id).await?;
        let (offset, limit) = clamp_page(query.offset, query.limit);
        let (items, total) =
            asset_operation::find_by_asset(&self.pool, asset_id, query, offset, limit).await?;
        Ok(Page::new(items, total, offset, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::{AssetOperationType, AssetStatus, OperationMetadata};

    async fn ledger() -> AssetLedger {
        let db = DbService::in_memory().await.unwrap();
        AssetLedger::new(db.pool)
    }

    fn borrow(status: OperationStatus) -> AssetOperationCreate {
        AssetOperationCreate {
            op_type: AssetOperationType::Borrow,
            status,
            actor_id: "u-1".into(),
            from_user_id: None,
            to_user_id: Some("u-2".into()),
            amount: None,
            note: None,
            metadata: OperationMetadata::default(),
        }
    }

    async fn laptop(ledger: &AssetLedger) -> Asset {
        ledger
            .create_asset(AssetCreate {
                name: "MacBook Pro".into(),
                category: Some("laptop".into()),
                status: None,
                owner_id: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn done_entry_does_not_touch_asset() {
        let ledger = ledger().await;
        let asset = laptop(&ledger).await;
        let op = ledger
            .create_operation(asset.id, borrow(OperationStatus::Done))
            .await
            .unwrap();
        assert!(op.completed_at.is_some());

        let unchanged = ledger.get_asset(asset.id).await.unwrap();
        assert_eq!(unchanged.status, AssetStatus::Idle);
        assert!(unchanged.owner_id.is_none());
    }

    #[tokio::test]
    async fn missing_asset_is_a_precondition_failure() {
        let ledger = ledger().await;
        let err = ledger
            .create_operation(404, borrow(OperationStatus::Pending))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AssetRequired);
    }

    #[tokio::test]
    async fn done_is_terminal() {
        let ledger = ledger().await;
        let asset = laptop(&ledger).await;
        let op = ledger
            .create_operation(asset.id, borrow(OperationStatus::Pending))
            .await
            .unwrap();

        let done = ledger
            .update_operation_status(op.id, OperationStatus::Done)
            .await
            .unwrap();
        assert_eq!(done.status, OperationStatus::Done);

        for next in [OperationStatus::Pending, OperationStatus::Cancelled, OperationStatus::Done] {
            let err = ledger.update_operation_status(op.id, next).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::OperationAlreadyDone);
        }

        let page = ledger
            .list_operations(asset.id, &OperationQuery::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn negative_amount_rejected() {
        let ledger = ledger().await;
        let asset = laptop(&ledger).await;
        let mut data = borrow(OperationStatus::Done);
        data.amount = Some(-10.0);
        let err = ledger.create_operation(asset.id, data).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
