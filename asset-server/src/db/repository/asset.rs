//! Asset Repository (资产目录)

use super::{RepoError, RepoResult};
use shared::models::{Asset, AssetCreate, AssetPatch, AssetQuery, AssetStatus};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, name, category, status, owner_id, created_at, updated_at";

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Asset>> {
    let asset = sqlx::query_as::<_, Asset>(&format!("SELECT {COLUMNS} FROM asset WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(asset)
}

pub async fn create(conn: &mut SqliteConnection, data: AssetCreate) -> RepoResult<Asset> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let status = data.status.unwrap_or(AssetStatus::Idle);

    let asset = sqlx::query_as::<_, Asset>(&format!(
        "INSERT INTO asset (id, name, category, status, owner_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(&data.name)
    .bind(&data.category)
    .bind(status)
    .bind(&data.owner_id)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(asset)
}

/// Apply a status / owner patch. Absent fields are left untouched.
pub async fn update(conn: &mut SqliteConnection, id: i64, patch: &AssetPatch) -> RepoResult<Asset> {
    let now = shared::util::now_millis();
    let asset = sqlx::query_as::<_, Asset>(&format!(
        "UPDATE asset SET status = COALESCE(?1, status), owner_id = COALESCE(?2, owner_id), updated_at = ?3 WHERE id = ?4 RETURNING {COLUMNS}"
    ))
    .bind(patch.status)
    .bind(&patch.owner_id)
    .bind(now)
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    asset.ok_or_else(|| RepoError::NotFound(format!("Asset {id} not found")))
}

pub async fn find_all(
    pool: &SqlitePool,
    query: &AssetQuery,
    offset: i64,
    limit: i64,
) -> RepoResult<(Vec<Asset>, i64)> {
    const FILTER: &str = "WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR owner_id = ?2) AND (?3 IS NULL OR category = ?3)";

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM asset {FILTER}"))
        .bind(query.status)
        .bind(&query.owner_id)
        .bind(&query.category)
        .fetch_one(pool)
        .await?;

    let items = sqlx::query_as::<_, Asset>(&format!(
        "SELECT {COLUMNS} FROM asset {FILTER} ORDER BY created_at DESC, id DESC LIMIT ?4 OFFSET ?5"
    ))
    .bind(query.status)
    .bind(&query.owner_id)
    .bind(&query.category)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((items, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn patch_keeps_absent_fields() {
        let db = DbService::in_memory().await.unwrap();
        let mut conn = db.pool.acquire().await.unwrap();
        let asset = create(
            &mut conn,
            AssetCreate {
                name: "ThinkPad X1".into(),
                category: Some("laptop".into()),
                status: None,
                owner_id: Some("u-1".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(asset.status, AssetStatus::Idle);

        let updated = update(
            &mut conn,
            asset.id,
            &AssetPatch {
                status: Some(AssetStatus::InUse),
                owner_id: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.status, AssetStatus::InUse);
        assert_eq!(updated.owner_id.as_deref(), Some("u-1"));
    }

    #[tokio::test]
    async fn update_missing_asset_is_not_found() {
        let db = DbService::in_memory().await.unwrap();
        let mut conn = db.pool.acquire().await.unwrap();
        let err = update(&mut conn, 42, &AssetPatch::default()).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
