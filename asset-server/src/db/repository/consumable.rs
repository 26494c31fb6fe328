//! Consumable Repository (耗材库存)
//!
//! Stock columns are written only through [`write_stock`], which the stock
//! ledger calls after validating the next values.

use super::{RepoError, RepoResult};
use shared::models::{Consumable, ConsumableCreate, ConsumableQuery, ConsumableStatus, InventoryFilter};
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, name, category, unit, keeper_id, quantity, reserved_quantity, safety_stock, status, created_at, updated_at";

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Consumable>> {
    let consumable = sqlx::query_as::<_, Consumable>(&format!(
        "SELECT {COLUMNS} FROM consumable WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(consumable)
}

/// Insert with empty stock; initial stock goes through the ledger
pub async fn create(conn: &mut SqliteConnection, data: &ConsumableCreate) -> RepoResult<Consumable> {
    if data.safety_stock < 0 {
        return Err(RepoError::Validation(format!(
            "safety_stock cannot be negative: {}",
            data.safety_stock
        )));
    }
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let status = ConsumableStatus::derive(ConsumableStatus::InStock, 0, 0, data.safety_stock);

    let consumable = sqlx::query_as::<_, Consumable>(&format!(
        "INSERT INTO consumable (id, name, category, unit, keeper_id, quantity, reserved_quantity, safety_stock, status, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, 0, 0, ?6, ?7, ?8, ?8) RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(&data.name)
    .bind(&data.category)
    .bind(&data.unit)
    .bind(&data.keeper_id)
    .bind(data.safety_stock)
    .bind(status)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(consumable)
}

/// Persist validated stock levels and the derived status
pub async fn write_stock(
    conn: &mut SqliteConnection,
    id: i64,
    quantity: i64,
    reserved_quantity: i64,
    status: ConsumableStatus,
) -> RepoResult<Consumable> {
    let now = shared::util::now_millis();
    let consumable = sqlx::query_as::<_, Consumable>(&format!(
        "UPDATE consumable SET quantity = ?1, reserved_quantity = ?2, status = ?3, updated_at = ?4 WHERE id = ?5 RETURNING {COLUMNS}"
    ))
    .bind(quantity)
    .bind(reserved_quantity)
    .bind(status)
    .bind(now)
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    consumable.ok_or_else(|| RepoError::NotFound(format!("Consumable {id} not found")))
}

/// Status-only write (archive / unarchive)
pub async fn set_status(
    conn: &mut SqliteConnection,
    id: i64,
    status: ConsumableStatus,
) -> RepoResult<Consumable> {
    let now = shared::util::now_millis();
    let consumable = sqlx::query_as::<_, Consumable>(&format!(
        "UPDATE consumable SET status = ?1, updated_at = ?2 WHERE id = ?3 RETURNING {COLUMNS}"
    ))
    .bind(status)
    .bind(now)
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    consumable.ok_or_else(|| RepoError::NotFound(format!("Consumable {id} not found")))
}

pub async fn delete(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM consumable WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn find_all(
    pool: &SqlitePool,
    query: &ConsumableQuery,
    offset: i64,
    limit: i64,
) -> RepoResult<(Vec<Consumable>, i64)> {
    const FILTER: &str = "WHERE (?1 IS NULL OR category = ?1) AND (?2 IS NULL OR keeper_id = ?2) AND (?3 IS NULL OR status = ?3) \
         AND (?4 IS NULL OR name LIKE '%' || ?4 || '%') AND (?5 OR status != 'archived')";

    let include_archived = query.include_archived || query.status == Some(ConsumableStatus::Archived);
    let keyword = query.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty());

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM consumable {FILTER}"))
        .bind(&query.category)
        .bind(&query.keeper_id)
        .bind(query.status)
        .bind(keyword)
        .bind(include_archived)
        .fetch_one(pool)
        .await?;

    let items = sqlx::query_as::<_, Consumable>(&format!(
        "SELECT {COLUMNS} FROM consumable {FILTER} ORDER BY name ASC, id ASC LIMIT ?6 OFFSET ?7"
    ))
    .bind(&query.category)
    .bind(&query.keeper_id)
    .bind(query.status)
    .bind(keyword)
    .bind(include_archived)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((items, total))
}

/// Every consumable matched by an inventory filter
pub async fn find_matching(
    db: impl SqliteExecutor<'_>,
    filter: &InventoryFilter,
) -> RepoResult<Vec<Consumable>> {
    let keyword = filter.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty());
    let items = sqlx::query_as::<_, Consumable>(&format!(
        "SELECT {COLUMNS} FROM consumable \
         WHERE (?1 IS NULL OR category = ?1) AND (?2 IS NULL OR keeper_id = ?2) \
         AND (json_array_length(?3) = 0 OR status IN (SELECT value FROM json_each(?3))) \
         AND (json_array_length(?4) = 0 OR id IN (SELECT value FROM json_each(?4))) \
         AND (?5 IS NULL OR name LIKE '%' || ?5 || '%') AND (?6 OR status != 'archived') \
         ORDER BY name ASC, id ASC"
    ))
    .bind(&filter.category)
    .bind(&filter.keeper_id)
    .bind(Json(&filter.statuses))
    .bind(Json(&filter.consumable_ids))
    .bind(keyword)
    .bind(filter.include_archived)
    .fetch_all(db)
    .await?;
    Ok(items)
}
