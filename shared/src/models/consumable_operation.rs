//! Consumable Operation Ledger Model (耗材出入库记录)

use super::metadata::OperationMetadata;
use super::operation::OperationStatus;
use crate::error::{AppError, ErrorCode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stock-affecting actions on a consumable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum ConsumableOperationType {
    Purchase,
    Inbound,
    Outbound,
    Reserve,
    Release,
    Adjust,
    Dispose,
}

impl ConsumableOperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
            Self::Reserve => "reserve",
            Self::Release => "release",
            Self::Adjust => "adjust",
            Self::Dispose => "dispose",
        }
    }

    /// Check delta signs against the operation type
    pub fn validate_deltas(&self, quantity_delta: i64, reserved_delta: i64) -> Result<(), AppError> {
        let ok = match self {
            Self::Purchase | Self::Inbound => quantity_delta >= 0 && reserved_delta >= 0,
            Self::Outbound | Self::Dispose => quantity_delta <= 0,
            Self::Reserve => reserved_delta >= 0 && quantity_delta == 0,
            Self::Release => reserved_delta <= 0 && quantity_delta == 0,
            Self::Adjust => true,
        };
        if ok {
            Ok(())
        } else {
            Err(AppError::with_message(
                ErrorCode::InvalidDelta,
                format!(
                    "{} does not accept quantity_delta={quantity_delta}, reserved_delta={reserved_delta}",
                    self.as_str()
                ),
            ))
        }
    }
}

impl fmt::Display for ConsumableOperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consumable ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ConsumableOperation {
    pub id: i64,
    pub consumable_id: i64,
    pub op_type: ConsumableOperationType,
    pub status: OperationStatus,
    pub quantity_delta: i64,
    pub reserved_delta: i64,
    pub actor_id: String,
    pub note: Option<String>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub metadata: OperationMetadata,
    pub created_at: i64,
    pub updated_at: i64,
    pub completed_at: Option<i64>,
}

/// Create consumable operation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumableOperationCreate {
    pub op_type: ConsumableOperationType,
    /// `done` applies stock effects immediately
    pub status: OperationStatus,
    #[serde(default)]
    pub quantity_delta: i64,
    #[serde(default)]
    pub reserved_delta: i64,
    pub actor_id: String,
    pub note: Option<String>,
    #[serde(default)]
    pub metadata: OperationMetadata,
}
