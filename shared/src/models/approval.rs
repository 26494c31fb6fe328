//! Approval Request Model (审批单)

use super::asset_operation::AssetOperationType;
use super::consumable_operation::ConsumableOperationType;
use super::metadata::ApprovalMetadata;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of approval-gated actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum ApprovalType {
    Purchase,
    Inbound,
    Receive,
    Borrow,
    Return,
    Transfer,
    Maintenance,
    Dispose,
    Recycle,
    Lost,
    Outbound,
    Reserve,
    Release,
    Adjust,
}

impl ApprovalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Inbound => "inbound",
            Self::Receive => "receive",
            Self::Borrow => "borrow",
            Self::Return => "return",
            Self::Transfer => "transfer",
            Self::Maintenance => "maintenance",
            Self::Dispose => "dispose",
            Self::Recycle => "recycle",
            Self::Lost => "lost",
            Self::Outbound => "outbound",
            Self::Reserve => "reserve",
            Self::Release => "release",
            Self::Adjust => "adjust",
        }
    }

    /// Asset ledger type this approval gates, if it applies to assets
    pub fn asset_operation_type(&self) -> Option<AssetOperationType> {
        match self {
            Self::Purchase => Some(AssetOperationType::Purchase),
            Self::Inbound => Some(AssetOperationType::Inbound),
            Self::Receive => Some(AssetOperationType::Receive),
            Self::Borrow => Some(AssetOperationType::Borrow),
            Self::Return => Some(AssetOperationType::Return),
            Self::Transfer => Some(AssetOperationType::Transfer),
            Self::Maintenance => Some(AssetOperationType::Maintenance),
            Self::Dispose => Some(AssetOperationType::Scrap),
            Self::Recycle => Some(AssetOperationType::Recycle),
            Self::Lost => Some(AssetOperationType::Lost),
            Self::Outbound | Self::Reserve | Self::Release | Self::Adjust => None,
        }
    }

    /// Consumable ledger type this approval gates, if it applies to consumables
    pub fn consumable_operation_type(&self) -> Option<ConsumableOperationType> {
        match self {
            Self::Purchase => Some(ConsumableOperationType::Purchase),
            Self::Inbound => Some(ConsumableOperationType::Inbound),
            Self::Outbound => Some(ConsumableOperationType::Outbound),
            Self::Reserve => Some(ConsumableOperationType::Reserve),
            Self::Release => Some(ConsumableOperationType::Release),
            Self::Adjust => Some(ConsumableOperationType::Adjust),
            Self::Dispose => Some(ConsumableOperationType::Dispose),
            Self::Receive
            | Self::Borrow
            | Self::Return
            | Self::Transfer
            | Self::Maintenance
            | Self::Recycle
            | Self::Lost => None,
        }
    }

    /// Types whose approval must always end with a linked asset ledger entry
    pub fn requires_asset_operation(&self) -> bool {
        matches!(
            self,
            Self::Receive | Self::Borrow | Self::Return | Self::Dispose | Self::Inbound
        )
    }
}

impl fmt::Display for ApprovalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Approval status. `pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human decision on a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalAction {
    Approve,
    Reject,
    Cancel,
}

impl ApprovalAction {
    pub fn target_status(&self) -> ApprovalStatus {
        match self {
            Self::Approve => ApprovalStatus::Approved,
            Self::Reject => ApprovalStatus::Rejected,
            Self::Cancel => ApprovalStatus::Cancelled,
        }
    }

    /// Human-readable result stored on the request
    pub fn result_text(&self, actor_id: &str, comment: Option<&str>) -> String {
        let verb = match self {
            Self::Approve => "Approved",
            Self::Reject => "Rejected",
            Self::Cancel => "Cancelled",
        };
        match comment.map(str::trim).filter(|c| !c.is_empty()) {
            Some(c) => format!("{verb} by {actor_id}: {c}"),
            None => format!("{verb} by {actor_id}"),
        }
    }
}

/// Approval request entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ApprovalRequest {
    pub id: i64,
    pub approval_type: ApprovalType,
    pub status: ApprovalStatus,
    pub title: String,
    pub reason: Option<String>,
    pub asset_id: Option<i64>,
    pub consumable_id: Option<i64>,
    pub asset_operation_id: Option<i64>,
    pub consumable_operation_id: Option<i64>,
    pub applicant_id: String,
    pub approver_id: Option<String>,
    pub result: Option<String>,
    pub comment: Option<String>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub metadata: ApprovalMetadata,
    /// Id of the mirrored todo in the external task tracker
    pub external_todo_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub completed_at: Option<i64>,
}

/// Create approval payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalCreate {
    pub approval_type: ApprovalType,
    pub title: String,
    pub reason: Option<String>,
    pub applicant_id: String,
    pub approver_id: Option<String>,
    pub asset_id: Option<i64>,
    pub consumable_id: Option<i64>,
    pub asset_operation_id: Option<i64>,
    pub consumable_operation_id: Option<i64>,
    pub external_todo_id: Option<String>,
    #[serde(default)]
    pub metadata: ApprovalMetadata,
}

/// Which side of the request the viewer is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalScope {
    Applicant,
    Approver,
}

/// Approval list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApprovalQuery {
    pub status: Option<ApprovalStatus>,
    pub approval_type: Option<ApprovalType>,
    pub scope: Option<ApprovalScope>,
    pub viewer_id: Option<String>,
    pub asset_id: Option<i64>,
    pub consumable_id: Option<i64>,
    pub asset_operation_id: Option<i64>,
    pub consumable_operation_id: Option<i64>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

/// Reassign approver payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproverReassign {
    pub approver_id: String,
}

/// Decision payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalDecision {
    pub action: ApprovalAction,
    pub actor_id: String,
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_is_open() {
        assert!(!ApprovalStatus::Pending.is_terminal());
        assert!(ApprovalStatus::Approved.is_terminal());
        assert!(ApprovalStatus::Rejected.is_terminal());
        assert!(ApprovalStatus::Cancelled.is_terminal());
    }

    #[test]
    fn dispose_maps_to_scrap() {
        assert_eq!(
            ApprovalType::Dispose.asset_operation_type(),
            Some(AssetOperationType::Scrap)
        );
        assert_eq!(
            ApprovalType::Dispose.consumable_operation_type(),
            Some(ConsumableOperationType::Dispose)
        );
        assert!(ApprovalType::Dispose.requires_asset_operation());
        assert!(!ApprovalType::Purchase.requires_asset_operation());
        assert!(!ApprovalType::Transfer.requires_asset_operation());
    }

    #[test]
    fn result_text_includes_comment() {
        assert_eq!(
            ApprovalAction::Approve.result_text("u-1", Some("  ok ")),
            "Approved by u-1: ok"
        );
        assert_eq!(
            ApprovalAction::Reject.result_text("u-2", Some("")),
            "Rejected by u-2"
        );
        assert_eq!(
            ApprovalAction::Cancel.target_status(),
            ApprovalStatus::Cancelled
        );
    }
}
