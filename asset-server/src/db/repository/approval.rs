//! Approval Request Repository (审批单)

use super::RepoResult;
use shared::models::{ApprovalCreate, ApprovalQuery, ApprovalRequest, ApprovalScope, ApprovalStatus};
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, approval_type, status, title, reason, asset_id, consumable_id, asset_operation_id, consumable_operation_id, applicant_id, approver_id, result, comment, metadata, external_todo_id, created_at, updated_at, completed_at";

pub async fn find_by_id(
    db: impl SqliteExecutor<'_>,
    id: i64,
) -> RepoResult<Option<ApprovalRequest>> {
    let approval = sqlx::query_as::<_, ApprovalRequest>(&format!(
        "SELECT {COLUMNS} FROM approval_request WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(approval)
}

/// Insert a resolved request as `pending`
pub async fn create(conn: &mut SqliteConnection, data: &ApprovalCreate) -> RepoResult<ApprovalRequest> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();

    let approval = sqlx::query_as::<_, ApprovalRequest>(&format!(
        "INSERT INTO approval_request (id, approval_type, status, title, reason, asset_id, consumable_id, asset_operation_id, consumable_operation_id, applicant_id, approver_id, metadata, external_todo_id, created_at, updated_at) \
         VALUES (?1, ?2, 'pending', ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13) RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(data.approval_type)
    .bind(&data.title)
    .bind(&data.reason)
    .bind(data.asset_id)
    .bind(data.consumable_id)
    .bind(data.asset_operation_id)
    .bind(data.consumable_operation_id)
    .bind(&data.applicant_id)
    .bind(&data.approver_id)
    .bind(Json(&data.metadata))
    .bind(&data.external_todo_id)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(approval)
}

/// Reassign while pending. `None` if missing or already decided.
pub async fn set_approver(
    conn: &mut SqliteConnection,
    id: i64,
    approver_id: &str,
) -> RepoResult<Option<ApprovalRequest>> {
    let now = shared::util::now_millis();
    let approval = sqlx::query_as::<_, ApprovalRequest>(&format!(
        "UPDATE approval_request SET approver_id = ?1, updated_at = ?2 WHERE id = ?3 AND status = 'pending' RETURNING {COLUMNS}"
    ))
    .bind(approver_id)
    .bind(now)
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(approval)
}

/// Terminal transition guarded on `status = 'pending'`.
///
/// Stamps `completed_at` and fills `approver_id` from the actor when unset.
/// Returns `None` when the row is missing or no longer pending.
pub async fn mark_decided(
    conn: &mut SqliteConnection,
    id: i64,
    status: ApprovalStatus,
    result: &str,
    comment: Option<&str>,
    actor_id: &str,
) -> RepoResult<Option<ApprovalRequest>> {
    let now = shared::util::now_millis();
    let approval = sqlx::query_as::<_, ApprovalRequest>(&format!(
        "UPDATE approval_request SET status = ?1, result = ?2, comment = ?3, approver_id = COALESCE(approver_id, ?4), completed_at = COALESCE(completed_at, ?5), updated_at = ?5 \
         WHERE id = ?6 AND status = 'pending' RETURNING {COLUMNS}"
    ))
    .bind(status)
    .bind(result)
    .bind(comment)
    .bind(actor_id)
    .bind(now)
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(approval)
}

/// Point the request at an asset / asset operation materialized during the decision
pub async fn link_asset(
    conn: &mut SqliteConnection,
    id: i64,
    asset_id: Option<i64>,
    asset_operation_id: Option<i64>,
) -> RepoResult<ApprovalRequest> {
    let now = shared::util::now_millis();
    let approval = sqlx::query_as::<_, ApprovalRequest>(&format!(
        "UPDATE approval_request SET asset_id = COALESCE(?1, asset_id), asset_operation_id = COALESCE(?2, asset_operation_id), updated_at = ?3 WHERE id = ?4 RETURNING {COLUMNS}"
    ))
    .bind(asset_id)
    .bind(asset_operation_id)
    .bind(now)
    .bind(id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(approval)
}

pub async fn find_all(
    pool: &SqlitePool,
    query: &ApprovalQuery,
    offset: i64,
    limit: i64,
) -> RepoResult<(Vec<ApprovalRequest>, i64)> {
    const FILTER: &str = "WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR approval_type = ?2) \
         AND (?3 IS NULL OR (?3 = 'applicant' AND applicant_id = ?4) OR (?3 = 'approver' AND approver_id = ?4)) \
         AND (?5 IS NULL OR asset_id = ?5) AND (?6 IS NULL OR consumable_id = ?6) \
         AND (?7 IS NULL OR asset_operation_id = ?7) AND (?8 IS NULL OR consumable_operation_id = ?8)";

    let scope = query.scope.map(|s| match s {
        ApprovalScope::Applicant => "applicant",
        ApprovalScope::Approver => "approver",
    });

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM approval_request {FILTER}"))
        .bind(query.status)
        .bind(query.approval_type)
        .bind(scope)
        .bind(&query.viewer_id)
        .bind(query.asset_id)
        .bind(query.consumable_id)
        .bind(query.asset_operation_id)
        .bind(query.consumable_operation_id)
        .fetch_one(pool)
        .await?;

    let items = sqlx::query_as::<_, ApprovalRequest>(&format!(
        "SELECT {COLUMNS} FROM approval_request {FILTER} ORDER BY created_at DESC, id DESC LIMIT ?9 OFFSET ?10"
    ))
    .bind(query.status)
    .bind(query.approval_type)
    .bind(scope)
    .bind(&query.viewer_id)
    .bind(query.asset_id)
    .bind(query.consumable_id)
    .bind(query.asset_operation_id)
    .bind(query.consumable_operation_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((items, total))
}
