//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// - 0xxx: General errors
/// - 4xxx: Approval errors
/// - 5xxx: Operation ledger errors
/// - 6xxx: Stock errors
/// - 7xxx: Inventory audit errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Approval errors (4xxx)
    Approval,
    /// Operation ledger errors (5xxx)
    Operation,
    /// Stock errors (6xxx)
    Stock,
    /// Inventory audit errors (7xxx)
    Inventory,
    /// System errors (9xxx and unassigned ranges)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            4000..5000 => Self::Approval,
            5000..6000 => Self::Operation,
            6000..7000 => Self::Stock,
            7000..8000 => Self::Inventory,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Approval => "approval",
            Self::Operation => "operation",
            Self::Stock => "stock",
            Self::Inventory => "inventory",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Approval);
        assert_eq!(ErrorCategory::from_code(5101), ErrorCategory::Operation);
        assert_eq!(ErrorCategory::from_code(6002), ErrorCategory::Stock);
        assert_eq!(ErrorCategory::from_code(7003), ErrorCategory::Inventory);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(
            ErrorCode::ApprovalNotPending.category(),
            ErrorCategory::Approval
        );
        assert_eq!(ErrorCode::AssetNotFound.category(), ErrorCategory::Operation);
        assert_eq!(ErrorCode::InsufficientStock.category(), ErrorCategory::Stock);
        assert_eq!(
            ErrorCode::NothingToAudit.category(),
            ErrorCategory::Inventory
        );
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Stock).unwrap();
        assert_eq!(json, "\"stock\"");
        let category: ErrorCategory = serde_json::from_str("\"approval\"").unwrap();
        assert_eq!(category, ErrorCategory::Approval);
    }
}
