//! 库存预警传播
//!
//! Stock changes are turned into open / resolved `consumable_alert` rows.
//! Alert propagation never fails the ledger operation that triggered it:
//! callers go through [`sync_best_effort`] after their transaction commits.

mod service;

pub use service::StockAlertService;

use async_trait::async_trait;
use shared::models::{AlertSnapshot, AlertSyncResult, Consumable, ConsumableAlert};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("alert storage error: {0}")]
    Storage(String),
}

impl From<crate::db::repository::RepoError> for AlertError {
    fn from(err: crate::db::repository::RepoError) -> Self {
        AlertError::Storage(err.to_string())
    }
}

impl From<sqlx::Error> for AlertError {
    fn from(err: sqlx::Error) -> Self {
        AlertError::Storage(err.to_string())
    }
}

#[async_trait]
pub trait AlertPropagator: Send + Sync {
    /// Reconcile open alerts with the current stock snapshot
    async fn sync_consumable_alert_snapshot(
        &self,
        snapshot: AlertSnapshot,
    ) -> Result<AlertSyncResult, AlertError>;

    /// Notify interested parties about alerts opened / resolved by a sync
    async fn propagate_consumable_alert_result(&self, result: &AlertSyncResult);

    /// Close every open alert of a consumable (used on delete)
    async fn resolve_alerts_for_consumable(
        &self,
        consumable_id: i64,
    ) -> Result<Vec<ConsumableAlert>, AlertError>;
}

pub fn snapshot_of(consumable: &Consumable) -> AlertSnapshot {
    AlertSnapshot {
        consumable_id: consumable.id,
        name: consumable.name.clone(),
        keeper_id: consumable.keeper_id.clone(),
        status: consumable.status,
        quantity: consumable.quantity,
        reserved_quantity: consumable.reserved_quantity,
    }
}

/// Sync and propagate, logging instead of raising
pub async fn sync_best_effort(alerts: &dyn AlertPropagator, consumable: &Consumable) {
    match alerts
        .sync_consumable_alert_snapshot(snapshot_of(consumable))
        .await
    {
        Ok(result) => {
            if !result.is_noop() {
                alerts.propagate_consumable_alert_result(&result).await;
            }
        }
        Err(e) => {
            tracing::warn!(consumable_id = consumable.id, error = %e, "Stock alert sync failed");
        }
    }
}
