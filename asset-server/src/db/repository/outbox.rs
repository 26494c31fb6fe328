//! Notification Outbox Repository

use super::RepoResult;
use shared::models::{OutboxEvent, OutboxQuery, TodoSyncPayload};
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, approval_id, external_todo_id, payload, status, attempts, last_error, next_attempt_at, created_at, updated_at";

/// Append an event. Called inside the decision transaction.
pub async fn enqueue(conn: &mut SqliteConnection, payload: &TodoSyncPayload) -> RepoResult<OutboxEvent> {
    let now = shared::util::now_millis();
    let event = sqlx::query_as::<_, OutboxEvent>(&format!(
        "INSERT INTO notification_outbox (id, approval_id, external_todo_id, payload, status, attempts, next_attempt_at, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, 'pending', 0, ?5, ?5, ?5) RETURNING {COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(payload.approval_id)
    .bind(&payload.external_todo_id)
    .bind(Json(payload))
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(event)
}

/// Pending events whose next attempt is due, oldest first
pub async fn find_due(db: impl SqliteExecutor<'_>, now: i64, limit: i64) -> RepoResult<Vec<OutboxEvent>> {
    let events = sqlx::query_as::<_, OutboxEvent>(&format!(
        "SELECT {COLUMNS} FROM notification_outbox WHERE status = 'pending' AND next_attempt_at <= ?1 ORDER BY next_attempt_at ASC, id ASC LIMIT ?2"
    ))
    .bind(now)
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(events)
}

pub async fn mark_delivered(db: impl SqliteExecutor<'_>, id: i64, attempts: i64) -> RepoResult<()> {
    sqlx::query(
        "UPDATE notification_outbox SET status = 'delivered', attempts = ?1, last_error = NULL, updated_at = ?2 WHERE id = ?3",
    )
    .bind(attempts)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn mark_retry(
    db: impl SqliteExecutor<'_>,
    id: i64,
    attempts: i64,
    next_attempt_at: i64,
    error: &str,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE notification_outbox SET attempts = ?1, next_attempt_at = ?2, last_error = ?3, updated_at = ?4 WHERE id = ?5",
    )
    .bind(attempts)
    .bind(next_attempt_at)
    .bind(error)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn mark_failed(db: impl SqliteExecutor<'_>, id: i64, attempts: i64, error: &str) -> RepoResult<()> {
    sqlx::query(
        "UPDATE notification_outbox SET status = 'failed', attempts = ?1, last_error = ?2, updated_at = ?3 WHERE id = ?4",
    )
    .bind(attempts)
    .bind(error)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn find_all(
    pool: &SqlitePool,
    query: &OutboxQuery,
    offset: i64,
    limit: i64,
) -> RepoResult<(Vec<OutboxEvent>, i64)> {
    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM notification_outbox WHERE (?1 IS NULL OR status = ?1)")
            .bind(query.status)
            .fetch_one(pool)
            .await?;

    let items = sqlx::query_as::<_, OutboxEvent>(&format!(
        "SELECT {COLUMNS} FROM notification_outbox WHERE (?1 IS NULL OR status = ?1) ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3"
    ))
    .bind(query.status)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((items, total))
}
