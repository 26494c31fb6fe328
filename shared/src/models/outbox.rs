//! Notification Outbox Model
//!
//! Approval decisions that must be mirrored to the external task tracker are
//! written here inside the decision transaction and delivered later.

use super::approval::{ApprovalRequest, ApprovalStatus, ApprovalType};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OutboxStatus {
    Pending,
    Delivered,
    /// Gave up after the configured number of attempts
    Failed,
}

impl OutboxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for OutboxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body sent to the external task tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoSyncPayload {
    pub approval_id: i64,
    pub external_todo_id: String,
    pub approval_type: ApprovalType,
    pub status: ApprovalStatus,
    pub title: String,
    pub result: Option<String>,
    pub approver_id: Option<String>,
    pub completed_at: Option<i64>,
}

impl TodoSyncPayload {
    /// Snapshot of a decided approval; `None` when it mirrors no external todo
    pub fn for_approval(approval: &ApprovalRequest) -> Option<Self> {
        let external_todo_id = approval.external_todo_id.clone()?;
        Some(Self {
            approval_id: approval.id,
            external_todo_id,
            approval_type: approval.approval_type,
            status: approval.status,
            title: approval.title.clone(),
            result: approval.result.clone(),
            approver_id: approval.approver_id.clone(),
            completed_at: approval.completed_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OutboxEvent {
    pub id: i64,
    pub approval_id: i64,
    pub external_todo_id: String,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub payload: TodoSyncPayload,
    pub status: OutboxStatus,
    pub attempts: i64,
    pub last_error: Option<String>,
    pub next_attempt_at: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutboxQuery {
    pub status: Option<OutboxStatus>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}
