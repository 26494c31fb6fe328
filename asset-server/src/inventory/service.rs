//! Inventory audit service

use crate::db::begin_write;
use crate::db::repository::{consumable, inventory};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_non_negative,
    validate_optional_text, validate_required_text,
};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    InventorySummary, InventoryTask, InventoryTaskCreate, InventoryTaskDetail, InventoryTaskQuery,
    InventoryTaskStatus, InventoryTaskUpdate,
};
use shared::types::Page;
use shared::util::clamp_page;
use sqlx::{SqliteConnection, SqlitePool};

fn task_not_found(id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::InventoryTaskNotFound,
        format!("Inventory task {id} not found"),
    )
    .with_detail("task_id", id)
}

async fn load_detail(conn: &mut SqliteConnection, task: InventoryTask) -> AppResult<InventoryTaskDetail> {
    let entries = inventory::find_entries(&mut *conn, task.id).await?;
    let summary = InventorySummary::from_entries(&entries);
    Ok(InventoryTaskDetail {
        task,
        entries,
        summary,
    })
}

#[derive(Clone)]
pub struct InventoryService {
    pool: SqlitePool,
}

impl InventoryService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Snapshot every matching consumable into a new `draft` task
    pub async fn create_task(&self, data: InventoryTaskCreate) -> AppResult<InventoryTaskDetail> {
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_required_text(&data.created_by, "created_by", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&data.filter.category, "category", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&data.filter.keeper_id, "keeper_id", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&data.filter.keyword, "keyword", MAX_NAME_LEN)?;

        let mut tx = begin_write(&self.pool).await?;
        let matched = consumable::find_matching(&mut *tx, &data.filter).await?;
        if matched.is_empty() {
            return Err(AppError::new(ErrorCode::NothingToAudit));
        }

        let task = inventory::create_task(&mut tx, data.name.trim(), &data.filter, &data.created_by).await?;
        for item in &matched {
            inventory::insert_entry(&mut tx, task.id, item).await?;
        }
        let detail = load_detail(&mut tx, task).await?;
        tx.commit().await?;

        tracing::info!(
            task_id = detail.task.id,
            entries = detail.summary.total,
            created_by = %detail.task.created_by,
            "Inventory task created"
        );
        Ok(detail)
    }

    /// Rename, move status forward, and/or record a batch of counts.
    ///
    /// Recording on a draft task starts it; the batch that leaves no pending
    /// entry completes it unless the caller set a status explicitly.
    pub async fn update_task(&self, id: i64, data: InventoryTaskUpdate) -> AppResult<InventoryTaskDetail> {
        if let Some(name) = &data.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        validate_optional_text(&data.recorded_by, "recorded_by", MAX_SHORT_TEXT_LEN)?;
        for record in &data.entries {
            if record.is_empty() {
                return Err(AppError::validation(
                    "entry record needs actual_quantity, actual_reserved or note",
                )
                .with_detail("entry_id", record.entry_id));
            }
            if let Some(q) = record.actual_quantity {
                validate_non_negative(q, "actual_quantity")?;
            }
            if let Some(r) = record.actual_reserved {
                validate_non_negative(r, "actual_reserved")?;
            }
            validate_optional_text(&record.note, "note", MAX_NOTE_LEN)?;
        }

        let mut tx = begin_write(&self.pool).await?;
        let task = inventory::find_task(&mut *tx, id)
            .await?
            .ok_or_else(|| task_not_found(id))?;

        if task.status == InventoryTaskStatus::Completed && !data.entries.is_empty() {
            return Err(AppError::new(ErrorCode::InventoryTaskCompleted).with_detail("task_id", id));
        }
        if let Some(next) = data.status
            && !task.status.can_transition_to(next)
        {
            return Err(AppError::with_message(
                ErrorCode::InvalidStatusTransition,
                format!("Cannot move inventory task from {} to {next}", task.status),
            )
            .with_detail("from", task.status.as_str())
            .with_detail("to", next.as_str()));
        }

        for record in &data.entries {
            inventory::record_entry(&mut tx, id, record, data.recorded_by.as_deref())
                .await?
                .ok_or_else(|| {
                    AppError::new(ErrorCode::InventoryEntryNotFound)
                        .with_detail("task_id", id)
                        .with_detail("entry_id", record.entry_id)
                })?;
        }

        let recorded = !data.entries.is_empty();
        let pending = inventory::count_pending(&mut *tx, id).await?;
        let next_status = match data.status {
            Some(InventoryTaskStatus::Completed) if pending > 0 => {
                return Err(AppError::new(ErrorCode::InventoryHasPendingEntries)
                    .with_detail("task_id", id)
                    .with_detail("pending", pending));
            }
            Some(InventoryTaskStatus::Draft) if recorded => Some(InventoryTaskStatus::InProgress),
            Some(explicit) => Some(explicit),
            None if recorded && pending == 0 => Some(InventoryTaskStatus::Completed),
            None if recorded && task.status == InventoryTaskStatus::Draft => {
                Some(InventoryTaskStatus::InProgress)
            }
            None => None,
        };

        let name = data.name.as_deref().map(str::trim);
        let updated = inventory::update_task(&mut tx, id, name, next_status).await?;
        let detail = load_detail(&mut tx, updated).await?;
        tx.commit().await?;

        tracing::info!(
            task_id = id,
            status = %detail.task.status,
            recorded = data.entries.len(),
            pending = detail.summary.pending,
            "Inventory task updated"
        );
        Ok(detail)
    }

    pub async fn get_task(&self, id: i64) -> AppResult<InventoryTaskDetail> {
        let mut conn = self.pool.acquire().await?;
        let task = inventory::find_task(&mut *conn, id)
            .await?
            .ok_or_else(|| task_not_found(id))?;
        load_detail(&mut conn, task).await
    }

    pub async fn list_tasks(&self, query: &InventoryTaskQuery) -> AppResult<Page<InventoryTask>> {
        let (offset, limit) = clamp_page(query.offset, query.limit);
        let (items, total) = inventory::find_tasks(&self.pool, query, offset, limit).await?;
        Ok(Page::new(items, total, offset, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::StockAlertService;
    use crate::db::DbService;
    use crate::ledger::ConsumableLedger;
    use shared::models::{
        Consumable, ConsumableCreate, EntryRecord, InventoryEntryStatus, InventoryFilter,
    };
    use std::sync::Arc;

    struct Fixture {
        inventory: InventoryService,
        consumables: ConsumableLedger,
    }

    async fn fixture() -> Fixture {
        let db = DbService::in_memory().await.unwrap();
        let alerts = Arc::new(StockAlertService::new(db.pool.clone()));
        Fixture {
            inventory: InventoryService::new(db.pool.clone()),
            consumables: ConsumableLedger::new(db.pool, alerts),
        }
    }

    async fn stock(f: &Fixture, name: &str, category: &str, quantity: i64) -> Consumable {
        f.consumables
            .create_consumable(ConsumableCreate {
                name: name.into(),
                category: Some(category.into()),
                unit: Some("box".into()),
                keeper_id: Some("keeper-1".into()),
                safety_stock: 1,
                initial_quantity: quantity,
                actor_id: "admin".into(),
            })
            .await
            .unwrap()
    }

    fn task(category: Option<&str>) -> InventoryTaskCreate {
        InventoryTaskCreate {
            name: "Q3 office count".into(),
            filter: InventoryFilter {
                category: category.map(Into::into),
                ..Default::default()
            },
            created_by: "auditor".into(),
        }
    }

    fn count(entry_id: i64, actual: i64) -> EntryRecord {
        EntryRecord {
            entry_id,
            actual_quantity: Some(actual),
            actual_reserved: None,
            note: None,
        }
    }

    fn record(entries: Vec<EntryRecord>) -> InventoryTaskUpdate {
        InventoryTaskUpdate {
            entries,
            recorded_by: Some("auditor".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn last_count_completes_task() {
        let f = fixture().await;
        stock(&f, "Pens", "office", 40).await;
        stock(&f, "Staples", "office", 12).await;
        stock(&f, "Toner", "office", 3).await;
        stock(&f, "Mop", "cleaning", 2).await;

        let created = f.inventory.create_task(task(Some("office"))).await.unwrap();
        assert_eq!(created.task.status, InventoryTaskStatus::Draft);
        assert_eq!(created.summary.total, 3);
        let ids: Vec<i64> = created.entries.iter().map(|e| e.id).collect();

        let partial = f
            .inventory
            .update_task(created.task.id, record(vec![count(ids[0], 38), count(ids[1], 12)]))
            .await
            .unwrap();
        assert_eq!(partial.task.status, InventoryTaskStatus::InProgress);
        assert_eq!(partial.summary.pending, 1);
        assert_eq!(partial.summary.recorded, 2);
        assert_eq!(partial.summary.variance_quantity, -2);
        assert!(partial.task.completed_at.is_none());

        let done = f
            .inventory
            .update_task(created.task.id, record(vec![count(ids[2], 4)]))
            .await
            .unwrap();
        assert_eq!(done.task.status, InventoryTaskStatus::Completed);
        assert!(done.task.completed_at.is_some());
        assert_eq!(done.summary.pending, 0);
        assert_eq!(done.summary.variance_quantity, -1);
        assert!(done
            .entries
            .iter()
            .all(|e| e.status == InventoryEntryStatus::Recorded && e.recorded_by.as_deref() == Some("auditor")));

        let err = f
            .inventory
            .update_task(created.task.id, record(vec![count(ids[0], 40)]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InventoryTaskCompleted);
    }

    #[tokio::test]
    async fn empty_filter_result_is_nothing_to_audit() {
        let f = fixture().await;
        stock(&f, "Pens", "office", 40).await;
        let err = f.inventory.create_task(task(Some("garden"))).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NothingToAudit);
        assert_eq!(
            f.inventory
                .list_tasks(&InventoryTaskQuery::default())
                .await
                .unwrap()
                .total,
            0
        );
    }

    #[tokio::test]
    async fn explicit_completion_needs_all_counts() {
        let f = fixture().await;
        stock(&f, "Pens", "office", 40).await;
        stock(&f, "Toner", "office", 3).await;
        let created = f.inventory.create_task(task(None)).await.unwrap();
        let first = created.entries[0].id;

        let mut update = record(vec![count(first, 40)]);
        update.status = Some(InventoryTaskStatus::Completed);
        let err = f.inventory.update_task(created.task.id, update).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InventoryHasPendingEntries);

        // Rolled back with the rejected status change
        let detail = f.inventory.get_task(created.task.id).await.unwrap();
        assert_eq!(detail.summary.pending, 2);
        assert_eq!(detail.task.status, InventoryTaskStatus::Draft);
    }

    #[tokio::test]
    async fn explicit_status_suppresses_auto_complete() {
        let f = fixture().await;
        stock(&f, "Pens", "office", 40).await;
        let created = f.inventory.create_task(task(None)).await.unwrap();

        let mut update = record(vec![count(created.entries[0].id, 41)]);
        update.status = Some(InventoryTaskStatus::InProgress);
        let detail = f.inventory.update_task(created.task.id, update).await.unwrap();
        assert_eq!(detail.task.status, InventoryTaskStatus::InProgress);
        assert_eq!(detail.summary.pending, 0);

        let backwards = InventoryTaskUpdate {
            status: Some(InventoryTaskStatus::Draft),
            ..Default::default()
        };
        let err = f.inventory.update_task(created.task.id, backwards).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStatusTransition);

        let finish = InventoryTaskUpdate {
            status: Some(InventoryTaskStatus::Completed),
            ..Default::default()
        };
        let detail = f.inventory.update_task(created.task.id, finish).await.unwrap();
        assert_eq!(detail.task.status, InventoryTaskStatus::Completed);
    }

    #[tokio::test]
    async fn record_validation() {
        let f = fixture().await;
        stock(&f, "Pens", "office", 40).await;
        let created = f.inventory.create_task(task(None)).await.unwrap();

        let blank = EntryRecord {
            entry_id: created.entries[0].id,
            actual_quantity: None,
            actual_reserved: None,
            note: Some("  ".into()),
        };
        let err = f
            .inventory
            .update_task(created.task.id, record(vec![blank]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let err = f
            .inventory
            .update_task(created.task.id, record(vec![count(404, 1)]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InventoryEntryNotFound);

        let err = f.inventory.get_task(404).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InventoryTaskNotFound);
    }

    #[tokio::test]
    async fn archived_skipped_unless_included() {
        let f = fixture().await;
        let pens = stock(&f, "Pens", "office", 40).await;
        let old = stock(&f, "Fax paper", "office", 5).await;
        f.consumables.set_archived(old.id, true).await.unwrap();

        let created = f.inventory.create_task(task(None)).await.unwrap();
        assert_eq!(created.summary.total, 1);
        assert_eq!(created.entries[0].consumable_id, pens.id);
        assert_eq!(created.entries[0].expected_quantity, 40);

        let mut all = task(None);
        all.filter.include_archived = true;
        let created = f.inventory.create_task(all).await.unwrap();
        assert_eq!(created.summary.total, 2);
    }
}
