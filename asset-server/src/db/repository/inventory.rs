//! Inventory Audit Repository (盘点任务)

use super::RepoResult;
use shared::models::{
    Consumable, EntryRecord, InventoryEntry, InventoryFilter, InventoryTask, InventoryTaskQuery,
    InventoryTaskStatus,
};
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const TASK_COLUMNS: &str = "id, name, status, filter, created_by, created_at, updated_at, completed_at";
const ENTRY_COLUMNS: &str = "id, task_id, consumable_id, consumable_name, expected_quantity, expected_reserved, actual_quantity, actual_reserved, variance_quantity, variance_reserved, status, note, recorded_by, recorded_at";

pub async fn find_task(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<InventoryTask>> {
    let task = sqlx::query_as::<_, InventoryTask>(&format!(
        "SELECT {TASK_COLUMNS} FROM inventory_task WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(task)
}

pub async fn find_entries(db: impl SqliteExecutor<'_>, task_id: i64) -> RepoResult<Vec<InventoryEntry>> {
    let entries = sqlx::query_as::<_, InventoryEntry>(&format!(
        "SELECT {ENTRY_COLUMNS} FROM inventory_entry WHERE task_id = ? ORDER BY consumable_name ASC, id ASC"
    ))
    .bind(task_id)
    .fetch_all(db)
    .await?;
    Ok(entries)
}

pub async fn create_task(
    conn: &mut SqliteConnection,
    name: &str,
    filter: &InventoryFilter,
    created_by: &str,
) -> RepoResult<InventoryTask> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let task = sqlx::query_as::<_, InventoryTask>(&format!(
        "INSERT INTO inventory_task (id, name, status, filter, created_by, created_at, updated_at) VALUES (?1, ?2, 'draft', ?3, ?4, ?5, ?5) RETURNING {TASK_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(Json(filter))
    .bind(created_by)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(task)
}

/// Snapshot the current stock of one consumable into a task
pub async fn insert_entry(
    conn: &mut SqliteConnection,
    task_id: i64,
    consumable: &Consumable,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO inventory_entry (id, task_id, consumable_id, consumable_name, expected_quantity, expected_reserved, status) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'pending')",
    )
    .bind(shared::util::snowflake_id())
    .bind(task_id)
    .bind(consumable.id)
    .bind(&consumable.name)
    .bind(consumable.quantity)
    .bind(consumable.reserved_quantity)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Store a count; variance is computed against the snapshot in SQL.
/// Returns `None` when the entry does not belong to the task.
pub async fn record_entry(
    conn: &mut SqliteConnection,
    task_id: i64,
    record: &EntryRecord,
    recorded_by: Option<&str>,
) -> RepoResult<Option<InventoryEntry>> {
    let now = shared::util::now_millis();
    let entry = sqlx::query_as::<_, InventoryEntry>(&format!(
        "UPDATE inventory_entry SET \
            actual_quantity = COALESCE(?1, actual_quantity), \
            actual_reserved = COALESCE(?2, actual_reserved), \
            variance_quantity = CASE WHEN ?1 IS NULL THEN variance_quantity ELSE ?1 - expected_quantity END, \
            variance_reserved = CASE WHEN ?2 IS NULL THEN variance_reserved ELSE ?2 - expected_reserved END, \
            note = COALESCE(?3, note), status = 'recorded', recorded_by = COALESCE(?4, recorded_by), recorded_at = ?5 \
         WHERE id = ?6 AND task_id = ?7 RETURNING {ENTRY_COLUMNS}"
    ))
    .bind(record.actual_quantity)
    .bind(record.actual_reserved)
    .bind(record.note.as_deref().map(str::trim).filter(|n| !n.is_empty()))
    .bind(recorded_by)
    .bind(now)
    .bind(record.entry_id)
    .bind(task_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(entry)
}

pub async fn count_pending(db: impl SqliteExecutor<'_>, task_id: i64) -> RepoResult<i64> {
    let pending: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM inventory_entry WHERE task_id = ? AND status = 'pending'",
    )
    .bind(task_id)
    .fetch_one(db)
    .await?;
    Ok(pending)
}

/// Rename and/or move the task status. `completed_at` is stamped once.
pub async fn update_task(
    conn: &mut SqliteConnection,
    id: i64,
    name: Option<&str>,
    status: Option<InventoryTaskStatus>,
) -> RepoResult<InventoryTask> {
    let now = shared::util::now_millis();
    let completed_at = (status == Some(InventoryTaskStatus::Completed)).then_some(now);
    let task = sqlx::query_as::<_, InventoryTask>(&format!(
        "UPDATE inventory_task SET name = COALESCE(?1, name), status = COALESCE(?2, status), completed_at = COALESCE(completed_at, ?3), updated_at = ?4 WHERE id = ?5 RETURNING {TASK_COLUMNS}"
    ))
    .bind(name)
    .bind(status)
    .bind(completed_at)
    .bind(now)
    .bind(id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(task)
}

pub async fn find_tasks(
    pool: &SqlitePool,
    query: &InventoryTaskQuery,
    offset: i64,
    limit: i64,
) -> RepoResult<(Vec<InventoryTask>, i64)> {
    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM inventory_task WHERE (?1 IS NULL OR status = ?1)")
            .bind(query.status)
            .fetch_one(pool)
            .await?;

    let items = sqlx::query_as::<_, InventoryTask>(&format!(
        "SELECT {TASK_COLUMNS} FROM inventory_task WHERE (?1 IS NULL OR status = ?1) ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3"
    ))
    .bind(query.status)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((items, total))
}
