//! Stock Alert Model (库存预警)

use super::consumable::ConsumableStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum AlertKind {
    LowStock,
    OutOfStock,
}

impl AlertKind {
    /// Alert a stock status calls for, if any
    pub fn for_status(status: ConsumableStatus) -> Option<AlertKind> {
        match status {
            ConsumableStatus::LowStock => Some(Self::LowStock),
            ConsumableStatus::OutOfStock => Some(Self::OutOfStock),
            ConsumableStatus::InStock | ConsumableStatus::Reserved | ConsumableStatus::Archived => {
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum AlertStatus {
    Open,
    Resolved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ConsumableAlert {
    pub id: i64,
    pub consumable_id: i64,
    pub kind: AlertKind,
    pub status: AlertStatus,
    pub quantity: i64,
    pub reserved_quantity: i64,
    pub opened_at: i64,
    pub resolved_at: Option<i64>,
}

/// Stock state handed to alert propagation after a ledger change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertSnapshot {
    pub consumable_id: i64,
    pub name: String,
    pub keeper_id: Option<String>,
    pub status: ConsumableStatus,
    pub quantity: i64,
    pub reserved_quantity: i64,
}

/// What a snapshot sync changed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertSyncResult {
    pub consumable_id: i64,
    pub keeper_id: Option<String>,
    pub opened: Vec<ConsumableAlert>,
    pub resolved: Vec<ConsumableAlert>,
}

impl AlertSyncResult {
    pub fn is_noop(&self) -> bool {
        self.opened.is_empty() && self.resolved.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_shortage_statuses_alert() {
        assert_eq!(
            AlertKind::for_status(ConsumableStatus::LowStock),
            Some(AlertKind::LowStock)
        );
        assert_eq!(
            AlertKind::for_status(ConsumableStatus::OutOfStock),
            Some(AlertKind::OutOfStock)
        );
        assert_eq!(AlertKind::for_status(ConsumableStatus::Reserved), None);
        assert_eq!(AlertKind::for_status(ConsumableStatus::Archived), None);
    }
}
