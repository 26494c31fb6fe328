//! Asset Operation Repository (资产操作记录)

use super::RepoResult;
use shared::models::{AssetOperation, AssetOperationCreate, OperationQuery, OperationStatus};
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, asset_id, op_type, status, actor_id, from_user_id, to_user_id, amount, note, metadata, generated_from_approval_id, created_at, updated_at, completed_at";

pub async fn find_by_id(
    db: impl SqliteExecutor<'_>,
    id: i64,
) -> RepoResult<Option<AssetOperation>> {
    let op = sqlx::query_as::<_, AssetOperation>(&format!(
        "SELECT {COLUMNS} FROM asset_operation WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(op)
}

/// Follow-up entry generated from a purchase approval, if any
pub async fn find_generated_from(
    db: impl SqliteExecutor<'_>,
    approval_id: i64,
) -> RepoResult<Option<AssetOperation>> {
    let op = sqlx::query_as::<_, AssetOperation>(&format!(
        "SELECT {COLUMNS} FROM asset_operation WHERE generated_from_approval_id = ?"
    ))
    .bind(approval_id)
    .fetch_optional(db)
    .await?;
    Ok(op)
}

/// Insert a ledger entry. `generated_from_approval_id` is unique, a second
/// follow-up for the same approval fails with [`super::RepoError::Duplicate`].
pub async fn create(
    conn: &mut SqliteConnection,
    asset_id: i64,
    data: &AssetOperationCreate,
    generated_from_approval_id: Option<i64>,
) -> RepoResult<AssetOperation> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let completed_at = (data.status == OperationStatus::Done).then_some(now);

    let op = sqlx::query_as::<_, AssetOperation>(&format!(
        "INSERT INTO asset_operation (id, asset_id, op_type, status, actor_id, from_user_id, to_user_id, amount, note, metadata, generated_from_approval_id, created_at, updated_at, completed_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12, ?13) RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(asset_id)
    .bind(data.op_type)
    .bind(data.status)
    .bind(&data.actor_id)
    .bind(&data.from_user_id)
    .bind(&data.to_user_id)
    .bind(data.amount)
    .bind(&data.note)
    .bind(Json(&data.metadata))
    .bind(generated_from_approval_id)
    .bind(now)
    .bind(completed_at)
    .fetch_one(&mut *conn)
    .await?;
    Ok(op)
}

/// Guarded status write: only succeeds while the row is still in `from`.
/// Returns `None` when the guard did not match.
pub async fn set_status(
    conn: &mut SqliteConnection,
    id: i64,
    from: OperationStatus,
    to: OperationStatus,
) -> RepoResult<Option<AssetOperation>> {
    let now = shared::util::now_millis();
    let completed_at = (to == OperationStatus::Done).then_some(now);
    let op = sqlx::query_as::<_, AssetOperation>(&format!(
        "UPDATE asset_operation SET status = ?1, completed_at = COALESCE(?2, completed_at), updated_at = ?3 WHERE id = ?4 AND status = ?5 RETURNING {COLUMNS}"
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

pub async fn find_by_asset(
    pool: &SqlitePool,
    asset_id: i64,
    query: &OperationQuery,
    offset: i64,
    limit: i64,
) -> RepoResult<(Vec<AssetOperation>, i64)> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM asset_operation WHERE asset_id = ?1 AND (?2 IS NULL OR status = ?2)",
    )
    .bind(asset_id)
    .bind(query.status)
    .fetch_one(pool)
    .await?;

    let items = sqlx::query_as::<_, AssetOperation>(&format!(
        "SELECT {COLUMNS} FROM asset_operation WHERE asset_id = ?1 AND (?2 IS NULL OR status = ?2) ORDER BY created_at DESC, id DESC LIMIT ?3 OFFSET ?4"
    ))
    .bind(asset_id)
    .bind(query.status)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((items, total))
}
