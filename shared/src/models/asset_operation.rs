//! Asset Operation Ledger Model (资产操作记录)

use super::asset::AssetStatus;
use super::metadata::OperationMetadata;
use super::operation::OperationStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Actions recorded against a single asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum AssetOperationType {
    Purchase,
    Inbound,
    Receive,
    Borrow,
    Return,
    Transfer,
    Maintenance,
    Scrap,
    Recycle,
    Lost,
}

impl AssetOperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Inbound => "inbound",
            Self::Receive => "receive",
            Self::Borrow => "borrow",
            Self::Return => "return",
            Self::Transfer => "transfer",
            Self::Maintenance => "maintenance",
            Self::Scrap => "scrap",
            Self::Recycle => "recycle",
            Self::Lost => "lost",
        }
    }

    /// Asset status after an approved operation of this type.
    ///
    /// `None` leaves the status untouched: a purchase only schedules an
    /// inbound, a transfer only changes the owner.
    pub fn inferred_asset_status(&self) -> Option<AssetStatus> {
        match self {
            Self::Purchase => None,
            Self::Transfer => None,
            Self::Inbound => Some(AssetStatus::Idle),
            Self::Receive => Some(AssetStatus::InUse),
            Self::Borrow => Some(AssetStatus::Borrowing),
            Self::Return => Some(AssetStatus::Idle),
            Self::Maintenance => Some(AssetStatus::Maintenance),
            Self::Scrap => Some(AssetStatus::Scrapped),
            Self::Recycle => Some(AssetStatus::Idle),
            Self::Lost => Some(AssetStatus::Lost),
        }
    }
}

impl fmt::Display for AssetOperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asset ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AssetOperation {
    pub id: i64,
    pub asset_id: i64,
    pub op_type: AssetOperationType,
    pub status: OperationStatus,
    pub actor_id: String,
    pub from_user_id: Option<String>,
    pub to_user_id: Option<String>,
    pub amount: Option<f64>,
    pub note: Option<String>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub metadata: OperationMetadata,
    /// Unique marker backing `metadata.auto_generated_from_approval_id`
    pub generated_from_approval_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub completed_at: Option<i64>,
}

/// Create asset operation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetOperationCreate {
    pub op_type: AssetOperationType,
    /// `pending` when an approval gates the action, `done` otherwise
    pub status: OperationStatus,
    pub actor_id: String,
    pub from_user_id: Option<String>,
    pub to_user_id: Option<String>,
    pub amount: Option<f64>,
    pub note: Option<String>,
    #[serde(default)]
    pub metadata: OperationMetadata,
}

/// Status change payload (shared by both ledgers)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OperationStatusUpdate {
    pub status: OperationStatus,
}

/// Ledger list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationQuery {
    pub status: Option<OperationStatus>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inference_table() {
        use AssetOperationType::*;
        assert_eq!(Receive.inferred_asset_status(), Some(AssetStatus::InUse));
        assert_eq!(Borrow.inferred_asset_status(), Some(AssetStatus::Borrowing));
        assert_eq!(Return.inferred_asset_status(), Some(AssetStatus::Idle));
        assert_eq!(Scrap.inferred_asset_status(), Some(AssetStatus::Scrapped));
        assert_eq!(Inbound.inferred_asset_status(), Some(AssetStatus::Idle));
        assert_eq!(Purchase.inferred_asset_status(), None);
        assert_eq!(Transfer.inferred_asset_status(), None);
    }

    #[test]
    fn op_type_serde_snake_case() {
        let json = serde_json::to_string(&AssetOperationType::Maintenance).unwrap();
        assert_eq!(json, "\"maintenance\"");
        let t: AssetOperationType = serde_json::from_str("\"lost\"").unwrap();
        assert_eq!(t, AssetOperationType::Lost);
    }
}
