//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::ApprovalNotFound
            | Self::OperationNotFound
            | Self::AssetNotFound
            | Self::ConsumableNotFound
            | Self::InventoryTaskNotFound
            | Self::InventoryEntryNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict (state machine guards)
            Self::AlreadyExists
            | Self::ApprovalNotPending
            | Self::OperationAlreadyDone
            | Self::InvalidStatusTransition
            | Self::InventoryTaskCompleted => StatusCode::CONFLICT,

            // 422 Unprocessable (invariants / missing preconditions)
            Self::ApproverRequired
            | Self::AssetRequired
            | Self::InsufficientStock
            | Self::ReservedExceedsQuantity
            | Self::NegativeReserved
            | Self::NothingToAudit
            | Self::InventoryHasPendingEntries => StatusCode::UNPROCESSABLE_ENTITY,

            // 503 Service Unavailable
            Self::NetworkError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Unknown | Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request
            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::RequiredField
            | Self::ValueOutOfRange
            | Self::ApprovalTargetInvalid
            | Self::InvalidDelta => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        assert_eq!(
            ErrorCode::ApprovalNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorCode::InventoryEntryNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_state_guard_status() {
        assert_eq!(
            ErrorCode::ApprovalNotPending.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::OperationAlreadyDone.http_status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_invariant_status() {
        assert_eq!(
            ErrorCode::InsufficientStock.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorCode::NothingToAudit.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_system_status() {
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::BAD_REQUEST
        );
    }
}
