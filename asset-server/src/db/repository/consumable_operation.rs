//! Consumable Operation Repository (耗材出入库记录)

use super::RepoResult;
use shared::models::{ConsumableOperation, ConsumableOperationCreate, OperationQuery, OperationStatus};
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, consumable_id, op_type, status, quantity_delta, reserved_delta, actor_id, note, metadata, created_at, updated_at, completed_at";

pub async fn find_by_id(
    db: impl SqliteExecutor<'_>,
    id: i64,
) -> RepoResult<Option<ConsumableOperation>> {
    let op = sqlx::query_as::<_, ConsumableOperation>(&format!(
        "SELECT {COLUMNS} FROM consumable_operation WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(op)
}

pub async fn create(
    conn: &mut SqliteConnection,
    consumable_id: i64,
    data: &ConsumableOperationCreate,
) -> RepoResult<ConsumableOperation> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let completed_at = (data.status == OperationStatus::Done).then_some(now);

    let op = sqlx::query_as::<_, ConsumableOperation>(&format!(
        "INSERT INTO consumable_operation (id, consumable_id, op_type, status, quantity_delta, reserved_delta, actor_id, note, metadata, created_at, updated_at, completed_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10, ?11) RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(consumable_id)
    .bind(data.op_type)
    .bind(data.status)
    .bind(data.quantity_delta)
    .bind(data.reserved_delta)
    .bind(&data.actor_id)
    .bind(&data.note)
    .bind(Json(&data.metadata))
    .bind(now)
    .bind(completed_at)
    .fetch_one(&mut *conn)
    .await?;
    Ok(op)
}

/// Guarded status write, `None` when the row is no longer in `from`
pub async fn set_status(
    conn: &mut SqliteConnection,
    id: i64,
    from: OperationStatus,
    to: OperationStatus,
) -> RepoResult<Option<ConsumableOperation>> {
    let now = shared::util::now_millis();
    let completed_at = (to == OperationStatus::Done).then_some(now);
    let op = sqlx::query_as::<_, ConsumableOperation>(&format!(
        "UPDATE consumable_operation SET status = ?1, completed_at = COALESCE(?2, completed_at), updated_at = ?3 WHERE id = ?4 AND status = ?5 RETURNING {COLUMNS}"
    ))
    .bind(to)
    .bind(completed_at)
    .bind(now)
    .bind(id)
    .bind(from)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(op)
}

pub async fn find_by_consumable(
    pool: &SqlitePool,
    consumable_id: i64,
    query: &OperationQuery,
    offset: i64,
    limit: i64,
) -> RepoResult<(Vec<ConsumableOperation>, i64)> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM consumable_operation WHERE consumable_id = ?1 AND (?2 IS NULL OR status = ?2)",
    )
    .bind(consumable_id)
    .bind(query.status)
    .fetch_one(pool)
    .await?;

    let items = sqlx::query_as::<_, ConsumableOperation>(&format!(
        "SELECT {COLUMNS} FROM consumable_operation WHERE consumable_id = ?1 AND (?2 IS NULL OR status = ?2) ORDER BY created_at DESC, id DESC LIMIT ?3 OFFSET ?4"
    ))
    .bind(consumable_id)
    .bind(query.status)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((items, total))
}
