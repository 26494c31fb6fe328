//! SQLite-backed stock alert service

use super::{AlertError, AlertPropagator};
use crate::db::begin_write;
use crate::db::repository::{alert, consumable};
use async_trait::async_trait;
use shared::models::{AlertKind, AlertSnapshot, AlertSyncResult, ConsumableAlert};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct StockAlertService {
    pool: SqlitePool,
}

impl StockAlertService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlertPropagator for StockAlertService {
    async fn sync_consumable_alert_snapshot(
        &self,
        snapshot: AlertSnapshot,
    ) -> Result<AlertSyncResult, AlertError> {
        let mut tx = begin_write(&self.pool).await?;

        // The snapshot may predate a later stock write; reconcile against the row
        let fresh = consumable::find_by_id(&mut *tx, snapshot.consumable_id).await?;
        let (snapshot, wanted) = match fresh {
            Some(c) => {
                let current = super::snapshot_of(&c);
                let wanted = AlertKind::for_status(current.status);
                (current, wanted)
            }
            None => {
                tracing::debug!(
                    consumable_id = snapshot.consumable_id,
                    "Consumable gone, resolving its open alerts"
                );
                (snapshot, None)
            }
        };

        let open = alert::find_open(&mut *tx, snapshot.consumable_id).await?;
        let mut result = AlertSyncResult {
            consumable_id: snapshot.consumable_id,
            keeper_id: snapshot.keeper_id.clone(),
            ..Default::default()
        };

        // Close alerts that no longer match the stock status
        for stale in open.iter().filter(|a| Some(a.kind) != wanted) {
            result
                .resolved
                .extend(alert::resolve(&mut tx, snapshot.consumable_id, Some(stale.kind)).await?);
        }

        if let Some(kind) = wanted
            && !open.iter().any(|a| a.kind == kind)
        {
            let opened = alert::open(
                &mut tx,
                snapshot.consumable_id,
                kind,
                snapshot.quantity,
                snapshot.reserved_quantity,
            )
            .await?;
            result.opened.push(opened);
        }

        tx.commit().await?;
        Ok(result)
    }

    async fn propagate_consumable_alert_result(&self, result: &AlertSyncResult) {
        for a in &result.opened {
            tracing::warn!(
                consumable_id = a.consumable_id,
                keeper_id = ?result.keeper_id,
                kind = ?a.kind,
                quantity = a.quantity,
                reserved = a.reserved_quantity,
                "Stock alert opened"
            );
        }
        for a in &result.resolved {
            tracing::info!(
                consumable_id = a.consumable_id,
                kind = ?a.kind,
                "Stock alert resolved"
            );
        }
    }

    async fn resolve_alerts_for_consumable(
        &self,
        consumable_id: i64,
    ) -> Result<Vec<ConsumableAlert>, AlertError> {
        let mut tx = begin_write(&self.pool).await?;
        let resolved = alert::resolve(&mut tx, consumable_id, None).await?;
        tx.commit().await?;
        if !resolved.is_empty() {
            tracing::info!(consumable_id, count = resolved.len(), "Resolved alerts for removed consumable");
        }
        Ok(resolved)
    }
}
