//! Unified error codes for the asset ledger
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Approval errors
//! - 5xxx: Operation ledger / asset errors
//! - 6xxx: Consumable stock errors
//! - 7xxx: Inventory audit errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 on the wire so the frontend can switch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Approval ====================
    /// Approval request not found
    ApprovalNotFound = 4001,
    /// Approval request is no longer pending
    ApprovalNotPending = 4002,
    /// No approver could be resolved for the request
    ApproverRequired = 4003,
    /// Approval target / operation link is inconsistent
    ApprovalTargetInvalid = 4004,

    // ==================== 5xxx: Operation ledger ====================
    /// Operation ledger entry not found
    OperationNotFound = 5001,
    /// Operation already done (terminal)
    OperationAlreadyDone = 5002,
    /// Status transition not allowed
    InvalidStatusTransition = 5003,
    /// Asset not found
    AssetNotFound = 5101,
    /// Operation needs an existing target asset
    AssetRequired = 5102,

    // ==================== 6xxx: Stock ====================
    /// Consumable not found
    ConsumableNotFound = 6001,
    /// Resulting quantity would be negative
    InsufficientStock = 6002,
    /// Resulting reserved quantity would exceed quantity
    ReservedExceedsQuantity = 6003,
    /// Resulting reserved quantity would be negative
    NegativeReserved = 6004,
    /// Delta sign does not match operation type
    InvalidDelta = 6005,

    // ==================== 7xxx: Inventory audit ====================
    /// Inventory task not found
    InventoryTaskNotFound = 7001,
    /// Inventory entry not found
    InventoryEntryNotFound = 7002,
    /// Filter matched no consumables
    NothingToAudit = 7003,
    /// Task already completed
    InventoryTaskCompleted = 7004,
    /// Task still has pending entries
    InventoryHasPendingEntries = 7005,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// Upstream system unreachable
    NetworkError = 9101,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Approval
            ErrorCode::ApprovalNotFound => "Approval request not found",
            ErrorCode::ApprovalNotPending => "Approval request already processed",
            ErrorCode::ApproverRequired => "No approver assigned",
            ErrorCode::ApprovalTargetInvalid => "Approval target is invalid",

            // Operation ledger
            ErrorCode::OperationNotFound => "Operation not found",
            ErrorCode::OperationAlreadyDone => "Operation already done",
            ErrorCode::InvalidStatusTransition => "Status transition not allowed",
            ErrorCode::AssetNotFound => "Asset not found",
            ErrorCode::AssetRequired => "Operation requires an existing asset",

            // Stock
            ErrorCode::ConsumableNotFound => "Consumable not found",
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::ReservedExceedsQuantity => "Reserved quantity exceeds stock",
            ErrorCode::NegativeReserved => "Reserved quantity cannot be negative",
            ErrorCode::InvalidDelta => "Delta does not match operation type",

            // Inventory
            ErrorCode::InventoryTaskNotFound => "Inventory task not found",
            ErrorCode::InventoryEntryNotFound => "Inventory entry not found",
            ErrorCode::NothingToAudit => "Nothing to audit",
            ErrorCode::InventoryTaskCompleted => "Inventory task already completed",
            ErrorCode::InventoryHasPendingEntries => "Inventory task has pending entries",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::NetworkError => "Network error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            4001 => Ok(ErrorCode::ApprovalNotFound),
            4002 => Ok(ErrorCode::ApprovalNotPending),
            4003 => Ok(ErrorCode::ApproverRequired),
            4004 => Ok(ErrorCode::ApprovalTargetInvalid),

            5001 => Ok(ErrorCode::OperationNotFound),
            5002 => Ok(ErrorCode::OperationAlreadyDone),
            5003 => Ok(ErrorCode::InvalidStatusTransition),
            5101 => Ok(ErrorCode::AssetNotFound),
            5102 => Ok(ErrorCode::AssetRequired),

            6001 => Ok(ErrorCode::ConsumableNotFound),
            6002 => Ok(ErrorCode::InsufficientStock),
            6003 => Ok(ErrorCode::ReservedExceedsQuantity),
            6004 => Ok(ErrorCode::NegativeReserved),
            6005 => Ok(ErrorCode::InvalidDelta),

            7001 => Ok(ErrorCode::InventoryTaskNotFound),
            7002 => Ok(ErrorCode::InventoryEntryNotFound),
            7003 => Ok(ErrorCode::NothingToAudit),
            7004 => Ok(ErrorCode::InventoryTaskCompleted),
            7005 => Ok(ErrorCode::InventoryHasPendingEntries),

            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),
            9101 => Ok(ErrorCode::NetworkError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::ApprovalNotPending.code(), 4002);
        assert_eq!(ErrorCode::OperationAlreadyDone.code(), 5002);
        assert_eq!(ErrorCode::InsufficientStock.code(), 6002);
        assert_eq!(ErrorCode::NothingToAudit.code(), 7003);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_try_from_roundtrip_all_codes() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::ValidationFailed,
            ErrorCode::ApprovalNotFound,
            ErrorCode::ApproverRequired,
            ErrorCode::InvalidStatusTransition,
            ErrorCode::AssetRequired,
            ErrorCode::ReservedExceedsQuantity,
            ErrorCode::InvalidDelta,
            ErrorCode::InventoryHasPendingEntries,
            ErrorCode::NetworkError,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
        assert_eq!(
            InvalidErrorCode(4999).to_string(),
            "invalid error code: 4999"
        );
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::InsufficientStock).unwrap();
        assert_eq!(json, "6002");
        let code: ErrorCode = serde_json::from_str("4002").unwrap();
        assert_eq!(code, ErrorCode::ApprovalNotPending);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_message() {
        assert_eq!(
            ErrorCode::ApprovalNotPending.message(),
            "Approval request already processed"
        );
        assert_eq!(ErrorCode::NothingToAudit.message(), "Nothing to audit");
    }
}
