//! Inventory Audit Model (盘点任务)

use super::consumable::ConsumableStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task status. Forward-only: draft → in_progress → completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum InventoryTaskStatus {
    Draft,
    InProgress,
    Completed,
}

impl InventoryTaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Same status or any later one
    pub fn can_transition_to(&self, next: InventoryTaskStatus) -> bool {
        next >= *self
    }
}

impl fmt::Display for InventoryTaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum InventoryEntryStatus {
    Pending,
    Recorded,
}

/// Which consumables a task snapshots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keeper_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statuses: Vec<ConsumableStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumable_ids: Vec<i64>,
    /// Substring match on name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(default)]
    pub include_archived: bool,
}

/// Inventory task entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct InventoryTask {
    pub id: i64,
    pub name: String,
    pub status: InventoryTaskStatus,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub filter: InventoryFilter,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub completed_at: Option<i64>,
}

/// One snapshotted consumable inside a task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct InventoryEntry {
    pub id: i64,
    pub task_id: i64,
    pub consumable_id: i64,
    pub consumable_name: String,
    pub expected_quantity: i64,
    pub expected_reserved: i64,
    pub actual_quantity: Option<i64>,
    pub actual_reserved: Option<i64>,
    pub variance_quantity: Option<i64>,
    pub variance_reserved: Option<i64>,
    pub status: InventoryEntryStatus,
    pub note: Option<String>,
    pub recorded_by: Option<String>,
    pub recorded_at: Option<i64>,
}

/// Create task payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryTaskCreate {
    pub name: String,
    #[serde(default)]
    pub filter: InventoryFilter,
    pub created_by: String,
}

/// A physical count for one entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRecord {
    pub entry_id: i64,
    pub actual_quantity: Option<i64>,
    pub actual_reserved: Option<i64>,
    pub note: Option<String>,
}

impl EntryRecord {
    pub fn is_empty(&self) -> bool {
        self.actual_quantity.is_none()
            && self.actual_reserved.is_none()
            && self.note.as_deref().is_none_or(|n| n.trim().is_empty())
    }
}

/// Update task payload: optional rename / status change plus a batch of counts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryTaskUpdate {
    pub name: Option<String>,
    pub status: Option<InventoryTaskStatus>,
    #[serde(default)]
    pub entries: Vec<EntryRecord>,
    pub recorded_by: Option<String>,
}

/// Aggregated counts for a task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub total: i64,
    pub pending: i64,
    pub recorded: i64,
    pub variance_quantity: i64,
    pub variance_reserved: i64,
}

impl InventorySummary {
    pub fn from_entries(entries: &[InventoryEntry]) -> Self {
        entries.iter().fold(
            Self {
                total: entries.len() as i64,
                ..Self::default()
            },
            |mut acc, e| {
                match e.status {
                    InventoryEntryStatus::Pending => acc.pending += 1,
                    InventoryEntryStatus::Recorded => acc.recorded += 1,
                }
                acc.variance_quantity += e.variance_quantity.unwrap_or(0);
                acc.variance_reserved += e.variance_reserved.unwrap_or(0);
                acc
            },
        )
    }
}

/// Task with its entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryTaskDetail {
    #[serde(flatten)]
    pub task: InventoryTask,
    pub entries: Vec<InventoryEntry>,
    pub summary: InventorySummary,
}

/// Task list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryTaskQuery {
    pub status: Option<InventoryTaskStatus>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(status: InventoryEntryStatus, variance: Option<i64>) -> InventoryEntry {
        InventoryEntry {
            id: 1,
            task_id: 1,
            consumable_id: 1,
            consumable_name: "A4 paper".into(),
            expected_quantity: 10,
            expected_reserved: 0,
            actual_quantity: variance.map(|v| 10 + v),
            actual_reserved: None,
            variance_quantity: variance,
            variance_reserved: None,
            status,
            note: None,
            recorded_by: None,
            recorded_at: None,
        }
    }

    #[test]
    fn status_moves_forward_only() {
        use InventoryTaskStatus::*;
        assert!(Draft.can_transition_to(InProgress));
        assert!(Draft.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(InProgress));
        assert!(!InProgress.can_transition_to(Draft));
        assert!(!Completed.can_transition_to(InProgress));
    }

    #[test]
    fn summary_counts_and_variance() {
        let entries = vec![
            entry(InventoryEntryStatus::Recorded, Some(-2)),
            entry(InventoryEntryStatus::Recorded, Some(1)),
            entry(InventoryEntryStatus::Pending, None),
        ];
        let s = InventorySummary::from_entries(&entries);
        assert_eq!(s.total, 3);
        assert_eq!(s.pending, 1);
        assert_eq!(s.recorded, 2);
        assert_eq!(s.variance_quantity, -1);
    }

    #[test]
    fn record_needs_count_or_note() {
        let blank = EntryRecord {
            entry_id: 1,
            actual_quantity: None,
            actual_reserved: None,
            note: Some("  ".into()),
        };
        assert!(blank.is_empty());
        let noted = EntryRecord {
            note: Some("shelf damaged".into()),
            ..blank
        };
        assert!(!noted.is_empty());
    }
}
