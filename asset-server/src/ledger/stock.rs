//! 库存账本 - 消耗品出入库记录的效果应用
//!
//! Everything here runs on a caller-owned connection inside a transaction
//! opened with [`crate::db::begin_write`]; the caller commits.

use crate::db::repository::{consumable, consumable_operation};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    Consumable, ConsumableOperation, ConsumableOperationCreate, ConsumableStatus, OperationStatus,
    Transition,
};
use sqlx::SqliteConnection;

/// Stock levels after applying one ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextStock {
    pub quantity: i64,
    pub reserved_quantity: i64,
    pub status: ConsumableStatus,
}

pub(crate) fn consumable_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::ConsumableNotFound, format!("Consumable {id} not found"))
        .with_detail("consumable_id", id)
}

pub(crate) fn operation_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::OperationNotFound, format!("Operation {id} not found"))
        .with_detail("operation_id", id)
}

fn delta_out_of_range(consumable_id: i64, field: &str, current: i64, delta: i64) -> AppError {
    AppError::with_message(
        ErrorCode::ValueOutOfRange,
        format!("{field} {delta} is out of range for consumable {consumable_id}"),
    )
    .with_detail("consumable_id", consumable_id)
    .with_detail("current", current)
    .with_detail("delta", delta)
}

/// Validate and compute the next stock levels. Pure; nothing is written.
pub fn compute_next(
    current: &Consumable,
    quantity_delta: i64,
    reserved_delta: i64,
) -> AppResult<NextStock> {
    let quantity = current
        .quantity
        .checked_add(quantity_delta)
        .ok_or_else(|| {
            delta_out_of_range(current.id, "quantity_delta", current.quantity, quantity_delta)
        })?;
    if quantity < 0 {
        return Err(AppError::insufficient_stock(
            current.id,
            current.quantity,
            quantity_delta,
        ));
    }

    let reserved_quantity = current
        .reserved_quantity
        .checked_add(reserved_delta)
        .ok_or_else(|| {
            delta_out_of_range(
                current.id,
                "reserved_delta",
                current.reserved_quantity,
                reserved_delta,
            )
        })?;
    if reserved_quantity < 0 {
        return Err(AppError::with_message(
            ErrorCode::NegativeReserved,
            format!(
                "Reserved quantity of consumable {} would drop to {reserved_quantity}",
                current.id
            ),
        )
        .with_detail("consumable_id", current.id)
        .with_detail("reserved_quantity", current.reserved_quantity)
        .with_detail("delta", reserved_delta));
    }
    if reserved_quantity > quantity {
        return Err(AppError::with_message(
            ErrorCode::ReservedExceedsQuantity,
            format!(
                "Reserved quantity {reserved_quantity} would exceed quantity {quantity} for consumable {}",
                current.id
            ),
        )
        .with_detail("consumable_id", current.id)
        .with_detail("quantity", quantity)
        .with_detail("reserved_quantity", reserved_quantity));
    }

    let status = ConsumableStatus::derive(
        current.status,
        quantity,
        reserved_quantity,
        current.safety_stock,
    );
    Ok(NextStock {
        quantity,
        reserved_quantity,
        status,
    })
}

/// Read current stock, validate, write the next levels
pub async fn apply_effects(
    conn: &mut SqliteConnection,
    op: &ConsumableOperation,
) -> AppResult<Consumable> {
    let current = consumable::find_by_id(&mut *conn, op.consumable_id)
        .await?
        .ok_or_else(|| consumable_not_found(op.consumable_id))?;

    let next = compute_next(&current, op.quantity_delta, op.reserved_delta)?;
    let updated = consumable::write_stock(
        conn,
        current.id,
        next.quantity,
        next.reserved_quantity,
        next.status,
    )
    .await?;

    tracing::debug!(
        consumable_id = updated.id,
        operation_id = op.id,
        op_type = %op.op_type,
        quantity = updated.quantity,
        reserved = updated.reserved_quantity,
        status = %updated.status,
        "Applied stock effects"
    );
    Ok(updated)
}

/// Insert a ledger entry; a `done` entry applies its effects immediately.
///
/// Returns the entry and, when stock changed, the updated consumable.
pub async fn create_in_tx(
    conn: &mut SqliteConnection,
    consumable_id: i64,
    data: &ConsumableOperationCreate,
) -> AppResult<(ConsumableOperation, Option<Consumable>)> {
    data.op_type
        .validate_deltas(data.quantity_delta, data.reserved_delta)?;
    if data.status == OperationStatus::Cancelled {
        return Err(AppError::validation(
            "operation must be created as pending or done",
        ));
    }

    if consumable::find_by_id(&mut *conn, consumable_id)
        .await?
        .is_none()
    {
        return Err(consumable_not_found(consumable_id));
    }

    let op = consumable_operation::create(conn, consumable_id, data).await?;
    let stock = if op.status == OperationStatus::Done {
        Some(apply_effects(conn, &op).await?)
    } else {
        None
    };
    Ok((op, stock))
}

/// Drive one entry through the status transition table.
///
/// pending → done applies effects exactly once; the guarded UPDATE makes a
/// second completion of the same entry impossible.
pub async fn transition_in_tx(
    conn: &mut SqliteConnection,
    operation_id: i64,
    next: OperationStatus,
) -> AppResult<(ConsumableOperation, Option<Consumable>)> {
    let op = consumable_operation::find_by_id(&mut *conn, operation_id)
        .await?
        .ok_or_else(|| operation_not_found(operation_id))?;

    match op.status.transition_to(next)? {
        Transition::Unchanged => Ok((op, None)),
        Transition::Changed => {
            let updated = consumable_operation::set_status(conn, op.id, op.status, next)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::InvalidStatusTransition))?;
            Ok((updated, None))
        }
        Transition::Complete => {
            let updated = consumable_operation::set_status(conn, op.id, op.status, next)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::OperationAlreadyDone))?;
            let stock = apply_effects(conn, &updated).await?;
            Ok((updated, Some(stock)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(quantity: i64, reserved: i64, safety: i64) -> Consumable {
        Consumable {
            id: 1,
            name: "A4 paper".into(),
            category: None,
            unit: None,
            keeper_id: None,
            quantity,
            reserved_quantity: reserved,
            safety_stock: safety,
            status: ConsumableStatus::derive(ConsumableStatus::InStock, quantity, reserved, safety),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn outbound_into_low_stock() {
        let next = compute_next(&stock(10, 0, 3), -8, 0).unwrap();
        assert_eq!(next.quantity, 2);
        assert_eq!(next.status, ConsumableStatus::LowStock);
    }

    #[test]
    fn overdraw_is_insufficient_stock() {
        let err = compute_next(&stock(2, 0, 3), -15, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
    }

    #[test]
    fn huge_delta_is_out_of_range() {
        let err = compute_next(&stock(5, 0, 0), i64::MAX, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);

        let err = compute_next(&stock(5, 2, 0), 0, i64::MAX).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);

        let err = compute_next(&stock(5, 0, 0), i64::MIN, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
    }

    #[test]
    fn reserved_bounds() {
        let err = compute_next(&stock(5, 1, 0), 0, -2).unwrap_err();
        assert_eq!(err.code, ErrorCode::NegativeReserved);

        let err = compute_next(&stock(5, 4, 0), -2, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ReservedExceedsQuantity);

        let next = compute_next(&stock(5, 0, 0), 0, 5).unwrap();
        assert_eq!(next.status, ConsumableStatus::Reserved);
    }

    #[test]
    fn archived_stays_archived() {
        let mut c = stock(10, 0, 3);
        c.status = ConsumableStatus::Archived;
        let next = compute_next(&c, -10, 0).unwrap();
        assert_eq!(next.status, ConsumableStatus::Archived);
    }
}
