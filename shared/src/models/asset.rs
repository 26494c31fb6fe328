//! Asset Model (资产目录)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Asset lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum AssetStatus {
    /// Purchase approved, waiting for physical receipt
    PendingInbound,
    Idle,
    InUse,
    Borrowing,
    Maintenance,
    Scrapped,
    Lost,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingInbound => "pending_inbound",
            Self::Idle => "idle",
            Self::InUse => "in_use",
            Self::Borrowing => "borrowing",
            Self::Maintenance => "maintenance",
            Self::Scrapped => "scrapped",
            Self::Lost => "lost",
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asset entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Asset {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub status: AssetStatus,
    /// Current holder / owner
    pub owner_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create asset payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetCreate {
    pub name: String,
    pub category: Option<String>,
    /// Defaults to `idle`
    pub status: Option<AssetStatus>,
    pub owner_id: Option<String>,
}

/// Partial update written by the approval orchestrator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetPatch {
    pub status: Option<AssetStatus>,
    pub owner_id: Option<String>,
}

impl AssetPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.owner_id.is_none()
    }
}

/// Asset list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetQuery {
    pub status: Option<AssetStatus>,
    pub owner_id: Option<String>,
    pub category: Option<String>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}
