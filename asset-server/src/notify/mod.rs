//! 外部待办同步 (transactional outbox)
//!
//! ```text
//! decide() ──tx──► notification_outbox (pending)
//!     └─ commit ─► OutboxHandle::wake() ─► OutboxWorker ─► ExternalTodoSync
//!                                              │
//!                      失败: attempts+1, 指数退避; 超过 max_attempts → failed
//! ```
//!
//! Delivery failures never touch the approval itself. Rows that give up are
//! left as `failed` and listed by `GET /api/notifications/outbox`.

mod client;
mod worker;

pub use client::{HttpTodoSync, NoopTodoSync};
pub use worker::{OutboxWorker, backoff_ms};

use crate::core::config::TodoSyncConfig;
use async_trait::async_trait;
use shared::models::TodoSyncPayload;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("external todo request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("external todo endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Mirror of an approval in the external task tracker
#[async_trait]
pub trait ExternalTodoSync: Send + Sync {
    async fn update_external_approval_todo(
        &self,
        payload: &TodoSyncPayload,
        external_todo_id: &str,
    ) -> Result<(), SyncError>;
}

/// Build the sync client from config; no URL means nothing is delivered
pub fn todo_sync_from_config(config: &TodoSyncConfig) -> Result<Arc<dyn ExternalTodoSync>, SyncError> {
    match &config.url {
        Some(url) => {
            let client = HttpTodoSync::new(
                url,
                config.token.clone(),
                Duration::from_millis(config.timeout_ms),
            )?;
            tracing::info!(url = %url, "External todo sync enabled");
            Ok(Arc::new(client))
        }
        None => {
            tracing::info!("External todo sync not configured, outbox events are acknowledged locally");
            Ok(Arc::new(NoopTodoSync))
        }
    }
}

/// Wakes the outbox worker after a decision commits.
///
/// A wake issued while the worker is busy is remembered, so no commit is missed.
#[derive(Debug, Clone, Default)]
pub struct OutboxHandle {
    notify: Arc<Notify>,
}

impl OutboxHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wake(&self) {
        self.notify.notify_one();
    }

    pub(crate) async fn notified(&self) {
        self.notify.notified().await;
    }
}
