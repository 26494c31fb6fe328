//! Ledger entry lifecycle shared by asset and consumable operations

use crate::error::{AppError, ErrorCode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ledger entry status
///
/// ```text
/// pending ──► done        (terminal, effects applied once)
///    │ ▲
///    ▼ │
/// cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OperationStatus {
    Pending,
    Done,
    Cancelled,
}

/// Outcome of a guarded status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Same status requested again, nothing to write
    Unchanged,
    /// Status changes, no ledger effects
    Changed,
    /// pending → done: ledger effects must be applied exactly once
    Complete,
}

/// Rejected status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    AlreadyDone,
    NotAllowed {
        from: OperationStatus,
        to: OperationStatus,
    },
}

impl OperationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
        }
    }

    /// Transition table. `done` is terminal; a cancelled entry must be
    /// re-submitted (back to pending) before it can complete.
    pub fn transition_to(self, next: OperationStatus) -> Result<Transition, TransitionError> {
        use OperationStatus::*;
        match (self, next) {
            (Done, _) => Err(TransitionError::AlreadyDone),
            (Pending, Done) => Ok(Transition::Complete),
            (Pending, Cancelled) | (Cancelled, Pending) => Ok(Transition::Changed),
            (Pending, Pending) | (Cancelled, Cancelled) => Ok(Transition::Unchanged),
            (Cancelled, Done) => Err(TransitionError::NotAllowed {
                from: Cancelled,
                to: Done,
            }),
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::AlreadyDone => AppError::new(ErrorCode::OperationAlreadyDone),
            TransitionError::NotAllowed { from, to } => AppError::with_message(
                ErrorCode::InvalidStatusTransition,
                format!("Cannot move operation from {from} to {to}"),
            )
            .with_detail("from", from.as_str())
            .with_detail("to", to.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::OperationStatus::*;
    use super::*;

    #[test]
    fn done_is_terminal() {
        for next in [Pending, Done, Cancelled] {
            assert_eq!(Done.transition_to(next), Err(TransitionError::AlreadyDone));
        }
    }

    #[test]
    fn pending_to_done_completes() {
        assert_eq!(Pending.transition_to(Done), Ok(Transition::Complete));
        assert_eq!(Pending.transition_to(Cancelled), Ok(Transition::Changed));
        assert_eq!(Pending.transition_to(Pending), Ok(Transition::Unchanged));
    }

    #[test]
    fn cancelled_must_be_resubmitted() {
        assert_eq!(Cancelled.transition_to(Pending), Ok(Transition::Changed));
        assert!(matches!(
            Cancelled.transition_to(Done),
            Err(TransitionError::NotAllowed { .. })
        ));
    }

    #[test]
    fn transition_error_maps_to_codes() {
        let err: AppError = TransitionError::AlreadyDone.into();
        assert_eq!(err.code, ErrorCode::OperationAlreadyDone);
        let err: AppError = Cancelled.transition_to(Done).unwrap_err().into();
        assert_eq!(err.code, ErrorCode::InvalidStatusTransition);
    }
}
