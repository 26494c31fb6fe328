//! Stock Alert Repository (库存预警)

use super::RepoResult;
use shared::models::{AlertKind, AlertStatus, ConsumableAlert};
use sqlx::{SqliteConnection, SqliteExecutor};

const COLUMNS: &str = "id, consumable_id, kind, status, quantity, reserved_quantity, opened_at, resolved_at";

pub async fn find_open(
    db: impl SqliteExecutor<'_>,
    consumable_id: i64,
) -> RepoResult<Vec<ConsumableAlert>> {
    let alerts = sqlx::query_as::<_, ConsumableAlert>(&format!(
        "SELECT {COLUMNS} FROM consumable_alert WHERE consumable_id = ? AND status = 'open' ORDER BY opened_at ASC"
    ))
    .bind(consumable_id)
    .fetch_all(db)
    .await?;
    Ok(alerts)
}

pub async fn find_by_consumable(
    db: impl SqliteExecutor<'_>,
    consumable_id: i64,
    status: Option<AlertStatus>,
) -> RepoResult<Vec<ConsumableAlert>> {
    let alerts = sqlx::query_as::<_, ConsumableAlert>(&format!(
        "SELECT {COLUMNS} FROM consumable_alert WHERE consumable_id = ?1 AND (?2 IS NULL OR status = ?2) ORDER BY opened_at DESC"
    ))
    .bind(consumable_id)
    .bind(status)
    .fetch_all(db)
    .await?;
    Ok(alerts)
}

pub async fn open(
    conn: &mut SqliteConnection,
    consumable_id: i64,
    kind: AlertKind,
    quantity: i64,
    reserved_quantity: i64,
) -> RepoResult<ConsumableAlert> {
    let alert = sqlx::query_as::<_, ConsumableAlert>(&format!(
        "INSERT INTO consumable_alert (id, consumable_id, kind, status, quantity, reserved_quantity, opened_at) VALUES (?1, ?2, ?3, 'open', ?4, ?5, ?6) RETURNING {COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(consumable_id)
    .bind(kind)
    .bind(quantity)
    .bind(reserved_quantity)
    .bind(shared::util::now_millis())
    .fetch_one(&mut *conn)
    .await?;
    Ok(alert)
}

/// Resolve open alerts of a consumable, optionally only those of one kind
pub async fn resolve(
    conn: &mut SqliteConnection,
    consumable_id: i64,
    kind: Option<AlertKind>,
) -> RepoResult<Vec<ConsumableAlert>> {
    let alerts = sqlx::query_as::<_, ConsumableAlert>(&format!(
        "UPDATE consumable_alert SET status = 'resolved', resolved_at = ?1 WHERE consumable_id = ?2 AND status = 'open' AND (?3 IS NULL OR kind = ?3) RETURNING {COLUMNS}"
    ))
    .bind(shared::util::now_millis())
    .bind(consumable_id)
    .bind(kind)
    .fetch_all(&mut *conn)
    .await?;
    Ok(alerts)
}
